//! Contiguous binary writer
//!
//! `BinaryWriter` appends into a single growable arena. Growth snaps small
//! buffers to fixed size classes, then doubles (or fits exactly when one
//! write outgrows a doubling). Every growth step allocates a fresh arena and
//! copies the written prefix forward; there is no shrink path.
//!
//! Finalizing with `to_value` hands the arena over as an immutable `Bytes`
//! without copying.

use bytes::{Bytes, BytesMut};
use strata_core::{ProtocolVersion, VersionPolicy, WireConfig};

use crate::archive::{Archive, Writer};
use crate::traits::Encode;

/// Per-allocation bookkeeping overhead subtracted from each size class.
pub const ARENA_BLOCK_HEADER_SIZE: usize = 16;

/// First size class.
pub const SMALL_ALLOCATION: usize = 512 - ARENA_BLOCK_HEADER_SIZE;

/// Second size class.
pub const PAGE_ALLOCATION: usize = 4096 - ARENA_BLOCK_HEADER_SIZE;

/// Allocation to move to when `size` bytes no longer fit in `allocated`.
pub fn next_allocation(allocated: usize, size: usize) -> usize {
    if size <= SMALL_ALLOCATION {
        SMALL_ALLOCATION
    } else if size <= PAGE_ALLOCATION {
        PAGE_ALLOCATION
    } else {
        (allocated * 2).max(size)
    }
}

/// Growable in-memory writer.
#[derive(Debug)]
pub struct BinaryWriter {
    data: BytesMut,
    allocated: usize,
    version: ProtocolVersion,
}

impl BinaryWriter {
    /// Create a writer for the given policy with default configuration.
    pub fn new(policy: VersionPolicy) -> Self {
        Self::with_config(&WireConfig::new(policy))
    }

    /// Create a writer, applying the configured version policy.
    ///
    /// An included version is written before anything else.
    pub fn with_config(config: &WireConfig) -> Self {
        let negotiated = config.policy.negotiate_write(config.default_version);
        let mut writer = BinaryWriter {
            data: BytesMut::new(),
            allocated: 0,
            version: negotiated.version,
        };
        if let Some(header) = negotiated.header {
            writer.write_bytes(&header);
        }
        writer
    }

    /// Encode one value into a fresh writer and finalize it.
    pub fn encode_to_bytes<T: Encode + ?Sized>(value: &T, policy: VersionPolicy) -> Bytes {
        let mut writer = Self::new(policy);
        value.encode(&mut writer);
        writer.to_value()
    }

    /// Bytes written so far, header included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the current allocation.
    pub fn capacity(&self) -> usize {
        self.allocated
    }

    /// Written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Finalize into an immutable value sharing the writer's arena.
    pub fn to_value(self) -> Bytes {
        self.data.freeze()
    }

    fn reserve_total(&mut self, size: usize) {
        if size <= self.allocated {
            return;
        }
        self.allocated = next_allocation(self.allocated, size);
        let mut grown = BytesMut::with_capacity(self.allocated);
        grown.extend_from_slice(&self.data);
        self.data = grown;
    }
}

impl Archive for BinaryWriter {
    fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }
}

impl Writer for BinaryWriter {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.reserve_total(self.data.len() + bytes.len());
        self.data.extend_from_slice(bytes);
    }
}
