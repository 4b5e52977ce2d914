//! Core types for the Strata wire protocol
//!
//! This crate defines the foundational types shared by every archive:
//! - ProtocolVersion: ordered wire-compatibility tag with flag bits
//! - VersionPolicy: unversioned / assumed / included version negotiation
//! - WireConfig: archive configuration and reader limits
//! - WireError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod policy;
pub mod version;

pub use config::{ConfigError, WireConfig, MAX_WIRE_LEN};
pub use error::{Result, WireError};
pub use policy::{ReadNegotiation, VersionPolicy, WriteNegotiation};
pub use version::{
    ProtocolVersion, COMPATIBLE_PROTOCOL_VERSION_MASK, CURRENT_PROTOCOL_VERSION,
    MIN_VALID_PROTOCOL_VERSION, OBJECT_SERIALIZER_FLAG, PROTOCOL_VERSION_SIZE, VERSION_FLAG_MASK,
};
