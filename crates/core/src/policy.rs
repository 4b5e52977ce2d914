//! Version policies
//!
//! A policy decides how an archive learns its ambient protocol version.
//! Negotiation is a pure step run once at construction, before any field is
//! read or written:
//!
//! | Policy | Writer | Reader |
//! |--------|--------|--------|
//! | `Unversioned` | caller default, no bytes | caller default, no bytes |
//! | `Assume(v)` | `v`, no bytes | `v`, no bytes |
//! | `Include(v)` | `v`, written first | read first, validated |
//!
//! The included-version read is the single compatibility gate of the
//! protocol: an invalid version or one newer than the reader supports is
//! rejected outright. There is no forward compatibility.

use crate::error::{Result, WireError};
use crate::version::{ProtocolVersion, CURRENT_PROTOCOL_VERSION, PROTOCOL_VERSION_SIZE};
use tracing::error;

/// How an archive obtains its protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPolicy {
    /// No version on the wire; the archive keeps the caller's default.
    Unversioned,
    /// No version on the wire; the archive uses the given version.
    Assume(ProtocolVersion),
    /// The version is the first field of the stream.
    Include(ProtocolVersion),
}

/// Outcome of writer-side negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteNegotiation {
    /// Ambient version for the writer
    pub version: ProtocolVersion,
    /// Header to emit before any payload, if the policy includes one
    pub header: Option<[u8; PROTOCOL_VERSION_SIZE]>,
}

/// Outcome of reader-side negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadNegotiation {
    /// Ambient version for the reader
    pub version: ProtocolVersion,
    /// Number of input bytes the header occupied
    pub header_len: usize,
}

impl VersionPolicy {
    /// Include the version spoken by this build.
    pub fn include_current() -> Self {
        VersionPolicy::Include(CURRENT_PROTOCOL_VERSION)
    }

    /// Bytes the policy places in front of the payload.
    pub const fn header_len(&self) -> usize {
        match self {
            VersionPolicy::Include(_) => PROTOCOL_VERSION_SIZE,
            VersionPolicy::Unversioned | VersionPolicy::Assume(_) => 0,
        }
    }

    /// Resolve the writer's ambient version and header.
    ///
    /// # Panics
    ///
    /// Panics if an `Include` policy carries an invalid version; writers
    /// never emit a version their own peers would reject.
    pub fn negotiate_write(&self, default: ProtocolVersion) -> WriteNegotiation {
        match *self {
            VersionPolicy::Unversioned => WriteNegotiation {
                version: default,
                header: None,
            },
            VersionPolicy::Assume(version) => WriteNegotiation {
                version,
                header: None,
            },
            VersionPolicy::Include(version) => {
                assert!(
                    version.is_valid(),
                    "included protocol version {} is not valid",
                    version
                );
                WriteNegotiation {
                    version,
                    header: Some(version.to_le_bytes()),
                }
            }
        }
    }

    /// Resolve the reader's ambient version from the start of `input`.
    ///
    /// For `Include`, the first 8 bytes are decoded and must be valid and no
    /// newer than `max_supported`. Rejections are logged with the offending
    /// value before the error is returned.
    pub fn negotiate_read(
        &self,
        input: &[u8],
        default: ProtocolVersion,
        max_supported: ProtocolVersion,
    ) -> Result<ReadNegotiation> {
        match *self {
            VersionPolicy::Unversioned => Ok(ReadNegotiation {
                version: default,
                header_len: 0,
            }),
            VersionPolicy::Assume(version) => Ok(ReadNegotiation {
                version,
                header_len: 0,
            }),
            VersionPolicy::Include(_) => {
                let header: [u8; PROTOCOL_VERSION_SIZE] = input
                    .get(..PROTOCOL_VERSION_SIZE)
                    .and_then(|bytes| bytes.try_into().ok())
                    .ok_or_else(|| WireError::eof(PROTOCOL_VERSION_SIZE, input.len()))?;
                let version = ProtocolVersion::from_le_bytes(header);

                if !version.is_valid() {
                    error!(
                        target: "strata::wire",
                        version = %version,
                        "Invalid serialization version"
                    );
                    return Err(WireError::IncompatibleProtocolVersion {
                        version: version.version_with_flags(),
                    });
                }
                if version > max_supported {
                    error!(
                        target: "strata::wire",
                        version = %version,
                        max_supported = %max_supported,
                        "Future protocol version"
                    );
                    return Err(WireError::IncompatibleProtocolVersion {
                        version: version.version_with_flags(),
                    });
                }

                Ok(ReadNegotiation {
                    version,
                    header_len: PROTOCOL_VERSION_SIZE,
                })
            }
        }
    }
}
