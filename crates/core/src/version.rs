//! Protocol version tags
//!
//! A protocol version is a 64-bit tag. The low 60 bits carry the version
//! proper and the top nibble carries flag bits. Ordering, equality and hashing
//! only look at the version bits, so a flagged tag compares equal to its
//! unflagged counterpart.
//!
//! On the wire a version is always the full flagged value as 8 little-endian
//! bytes.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Mask selecting the version bits (everything but the flag nibble)
pub const VERSION_FLAG_MASK: u64 = 0x0FFF_FFFF_FFFF_FFFF;

/// Flag marking a peer that speaks the object serializer
pub const OBJECT_SERIALIZER_FLAG: u64 = 0x1000_0000_0000_0000;

/// Versions that agree under this mask are wire compatible
pub const COMPATIBLE_PROTOCOL_VERSION_MASK: u64 = 0xFFFF_FFFF_FFFF_0000;

/// Size of a serialized protocol version in bytes
pub const PROTOCOL_VERSION_SIZE: usize = 8;

const MIN_VALID_RAW: u64 = 0x0FDB_00A2_0006_0001;
const CURRENT_RAW: u64 = 0x0FDB_00B0_6106_0001;

/// Oldest version this build can interpret at all
pub const MIN_VALID_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(MIN_VALID_RAW);

/// Version spoken by this build; bounds acceptable incoming versions
pub const CURRENT_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(CURRENT_RAW);

/// Wire-compatibility tag with flag bits.
#[derive(Clone, Copy)]
pub struct ProtocolVersion(u64);

impl ProtocolVersion {
    /// Wrap a raw (possibly flagged) version value.
    pub const fn new(version_with_flags: u64) -> Self {
        ProtocolVersion(version_with_flags)
    }

    /// Version bits only.
    pub const fn version(self) -> u64 {
        self.0 & VERSION_FLAG_MASK
    }

    /// Raw value including flag bits, as written to the wire.
    pub const fn version_with_flags(self) -> u64 {
        self.0
    }

    /// True when this build knows how to interpret the version at all.
    pub const fn is_valid(self) -> bool {
        self.version() >= MIN_VALID_RAW
    }

    /// True when both versions agree on the compatible prefix.
    pub const fn is_compatible(self, other: ProtocolVersion) -> bool {
        (self.version() & COMPATIBLE_PROTOCOL_VERSION_MASK)
            == (other.version() & COMPATIBLE_PROTOCOL_VERSION_MASK)
    }

    /// Whether the object serializer flag is set.
    pub const fn has_object_serializer_flag(self) -> bool {
        self.0 & OBJECT_SERIALIZER_FLAG != 0
    }

    /// Copy of this version with the object serializer flag set.
    pub const fn with_object_serializer_flag(self) -> Self {
        ProtocolVersion(self.0 | OBJECT_SERIALIZER_FLAG)
    }

    /// Copy of this version with the object serializer flag cleared.
    pub const fn without_object_serializer_flag(self) -> Self {
        ProtocolVersion(self.0 & !OBJECT_SERIALIZER_FLAG)
    }

    /// Serialize to the 8-byte wire form.
    pub const fn to_le_bytes(self) -> [u8; PROTOCOL_VERSION_SIZE] {
        self.0.to_le_bytes()
    }

    /// Deserialize from the 8-byte wire form.
    pub const fn from_le_bytes(bytes: [u8; PROTOCOL_VERSION_SIZE]) -> Self {
        ProtocolVersion(u64::from_le_bytes(bytes))
    }
}

impl PartialEq for ProtocolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version() == other.version()
    }
}

impl Eq for ProtocolVersion {}

impl PartialOrd for ProtocolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProtocolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version().cmp(&other.version())
    }
}

impl Hash for ProtocolVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version().hash(state);
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Debug for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtocolVersion({:#018x})", self.0)
    }
}

impl From<u64> for ProtocolVersion {
    fn from(raw: u64) -> Self {
        ProtocolVersion(raw)
    }
}
