//! Archive configuration.
//!
//! Every writer and reader is built from a `WireConfig`. The version policy
//! is applied once at construction; the remaining fields bound what a reader
//! will accept from a peer.

use crate::policy::VersionPolicy;
use crate::version::{ProtocolVersion, CURRENT_PROTOCOL_VERSION};

/// Largest container length representable by the signed 32-bit prefix.
pub const MAX_WIRE_LEN: usize = i32::MAX as usize;

/// Archive configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireConfig {
    /// How the archive obtains its protocol version.
    pub policy: VersionPolicy,

    /// Ambient version for `Unversioned` archives (default: current).
    pub default_version: ProtocolVersion,

    /// Newest version an included-version reader accepts (default: current).
    pub max_supported_version: ProtocolVersion,

    /// Largest container length a reader accepts (default: `i32::MAX`).
    pub max_container_len: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig {
            policy: VersionPolicy::Unversioned,
            default_version: CURRENT_PROTOCOL_VERSION,
            max_supported_version: CURRENT_PROTOCOL_VERSION,
            max_container_len: MAX_WIRE_LEN,
        }
    }
}

impl WireConfig {
    /// Create a configuration for the given policy with default limits.
    pub fn new(policy: VersionPolicy) -> Self {
        WireConfig {
            policy,
            ..Self::default()
        }
    }

    /// Include the current version as the first field.
    pub fn included() -> Self {
        Self::new(VersionPolicy::include_current())
    }

    /// No version on the wire.
    pub fn unversioned() -> Self {
        Self::new(VersionPolicy::Unversioned)
    }

    /// No version on the wire, archive assumes `version`.
    pub fn assumed(version: ProtocolVersion) -> Self {
        Self::new(VersionPolicy::Assume(version))
    }

    /// Set the ambient version used by `Unversioned` archives (builder pattern).
    pub fn with_default_version(mut self, version: ProtocolVersion) -> Self {
        self.default_version = version;
        self
    }

    /// Set the newest accepted incoming version (builder pattern).
    pub fn with_max_supported_version(mut self, version: ProtocolVersion) -> Self {
        self.max_supported_version = version;
        self
    }

    /// Set the container length limit (builder pattern).
    pub fn with_max_container_len(mut self, len: usize) -> Self {
        self.max_container_len = len;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_version.is_valid() {
            return Err(ConfigError::InvalidDefaultVersion(
                self.default_version.version_with_flags(),
            ));
        }
        match self.policy {
            VersionPolicy::Assume(v) | VersionPolicy::Include(v) if !v.is_valid() => {
                return Err(ConfigError::InvalidPolicyVersion(v.version_with_flags()));
            }
            _ => {}
        }
        if !self.max_supported_version.is_valid() {
            return Err(ConfigError::InvalidMaxSupportedVersion(
                self.max_supported_version.version_with_flags(),
            ));
        }
        if self.max_container_len > MAX_WIRE_LEN {
            return Err(ConfigError::ContainerLimitTooLarge(self.max_container_len));
        }
        Ok(())
    }

    /// Create a configuration suited to tests (small container limit).
    pub fn for_testing() -> Self {
        WireConfig {
            max_container_len: 4096,
            ..Self::included()
        }
    }
}

impl From<VersionPolicy> for WireConfig {
    fn from(policy: VersionPolicy) -> Self {
        WireConfig::new(policy)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Default ambient version is not a valid protocol version.
    #[error("Default version {0:#018x} is not valid")]
    InvalidDefaultVersion(u64),

    /// Assumed or included version is not a valid protocol version.
    #[error("Policy version {0:#018x} is not valid")]
    InvalidPolicyVersion(u64),

    /// Newest accepted version is not a valid protocol version.
    #[error("Max supported version {0:#018x} is not valid")]
    InvalidMaxSupportedVersion(u64),

    /// Container limit does not fit the signed 32-bit length prefix.
    #[error("Container limit {0} exceeds the wire maximum")]
    ContainerLimitTooLarge(usize),
}
