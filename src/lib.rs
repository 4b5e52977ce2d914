//! Strata wire - versioned binary wire protocol and serialization engine
//!
//! Typed values are encoded through one dispatch layer (`Encode` / `Decode`)
//! into one of two physical archives:
//!
//! - `BinaryWriter` / `BinaryReader` / `ArenaReader`: contiguous memory, for
//!   client-facing values and persisted records
//! - `PacketWriter`: chains of fixed-size, reference-counted packet buffers,
//!   for outbound network messages built incrementally and sent partially
//!
//! Every archive carries an ambient `ProtocolVersion`, negotiated once at
//! construction by its `VersionPolicy`.
//!
//! # Quick Start
//!
//! ```
//! use strata_wire::{BinaryReader, BinaryWriter, Decode, Encode, VersionPolicy};
//!
//! let bytes = BinaryWriter::encode_to_bytes(&(300u32, "ab"), VersionPolicy::include_current());
//! let (n, s): (u32, String) =
//!     BinaryReader::decode_from(&bytes, VersionPolicy::include_current()).unwrap();
//! assert_eq!((n, s.as_str()), (300, "ab"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod source;

pub use source::{enqueue, BoolAndSource, SerializeSource, SerializeTarget, ValueSource};

pub use strata_codec::{
    check_version, decode_len, encode_len, wire_struct, Archive, ArenaReader, BinaryItem,
    BinaryReader, BinaryWriter, Decode, Encode, Reader, ScalarTag, TupleRead, TupleWrite, Writer,
};
pub use strata_core::{
    ConfigError, ProtocolVersion, Result, VersionPolicy, WireConfig, WireError,
    CURRENT_PROTOCOL_VERSION, MIN_VALID_PROTOCOL_VERSION,
};
pub use strata_packet::{
    read_frame, write_framed, BufferId, OverWriter, PacketChain, PacketSlab, PacketWriter,
    ReliablePacket, SharedPacketSlab, UnsentQueue, PACKET_DATA_SIZE,
};
