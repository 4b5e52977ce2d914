//! Encode/decode dispatch and contiguous archives for the Strata wire protocol
//!
//! This crate provides:
//! - Encode / Decode: the per-type customization point
//! - BinaryItem: the sealed set of scalars encoded by raw copy
//! - Writer / Reader: archive traits every backend implements
//! - BinaryWriter: growable single-arena writer
//! - BinaryReader / ArenaReader: bounds-checked readers over borrowed or shared memory
//! - TupleWrite / TupleRead: order-preserving key encoding
//!
//! # Wire Format
//!
//! | Item | Encoding |
//! |------|----------|
//! | Included version | 8 bytes LE, first field of the message |
//! | Scalars | raw little-endian image |
//! | Containers, strings | i32 LE length, then elements |
//! | Tuples, structs | fields in order, no framing |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod composite;
pub mod containers;
pub mod reader;
pub mod scalar;
pub mod traits;
pub mod tuple;
pub mod writer;

pub use archive::{check_version, Archive, Reader, Writer};
pub use reader::{ArenaReader, BinaryReader};
pub use scalar::{BinaryItem, ScalarTag, MAX_ITEM_SIZE};
pub use traits::{decode_len, encode_len, Decode, Encode};
pub use tuple::{TupleRead, TupleWrite};
pub use writer::{next_allocation, BinaryWriter, ARENA_BLOCK_HEADER_SIZE};

pub use strata_core::{ProtocolVersion, Result, VersionPolicy, WireConfig, WireError};
