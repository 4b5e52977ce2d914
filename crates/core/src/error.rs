//! Error types for the wire protocol
//!
//! Version incompatibility is the one condition callers are expected to
//! catch (typically to drop a peer). Everything else signals a corrupt stream
//! or a misbehaving peer and is surfaced the same way so the caller can stop
//! decoding.

use thiserror::Error;

/// Result type alias for wire operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors raised while decoding a wire stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Decoded protocol version is invalid or newer than this build supports
    #[error("Incompatible protocol version: {version:#018x}")]
    IncompatibleProtocolVersion {
        /// Offending version value, flags included
        version: u64,
    },

    /// Read past the end of the input
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the read asked for
        needed: usize,
        /// Bytes left in the input
        remaining: usize,
    },

    /// Container length prefix was negative
    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),

    /// Container length prefix exceeds the configured maximum
    #[error("Length {len} exceeds limit {max}")]
    LengthLimitExceeded {
        /// Decoded length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// String payload is not UTF-8
    #[error("Invalid UTF-8 string")]
    InvalidUtf8,

    /// Boolean byte other than 0 or 1
    #[error("Invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    /// Structurally invalid encoding
    #[error("Malformed encoding: {0}")]
    Malformed(String),

    /// Frame checksum did not match its payload
    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the frame
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },

    /// Input continues past the decoded value
    #[error("Trailing bytes after value: {0}")]
    TrailingBytes(usize),
}

impl WireError {
    /// Create an end-of-data error.
    pub fn eof(needed: usize, remaining: usize) -> Self {
        WireError::UnexpectedEof { needed, remaining }
    }

    /// Create a malformed-encoding error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        WireError::Malformed(detail.into())
    }

    /// True for the protocol version gate failure.
    pub fn is_incompatible_version(&self) -> bool {
        matches!(self, WireError::IncompatibleProtocolVersion { .. })
    }
}
