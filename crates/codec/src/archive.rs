//! Archive traits
//!
//! An archive is a stateful cursor over a byte stream carrying an ambient
//! protocol version. Writers expose byte and scalar primitives; readers
//! expose bounds-checked reads. Every backend (contiguous buffer, packet
//! chain, reserved span) implements one of these traits, and the `Encode` /
//! `Decode` dispatch is written against them only.

use bytes::Bytes;
use strata_core::{ProtocolVersion, Result};

use crate::scalar::{BinaryItem, MAX_ITEM_SIZE};

/// State shared by every archive.
pub trait Archive {
    /// Ambient protocol version.
    fn protocol_version(&self) -> ProtocolVersion;

    /// Replace the ambient protocol version.
    fn set_protocol_version(&mut self, version: ProtocolVersion);
}

/// Sink side of an archive.
pub trait Writer: Archive {
    /// Append raw bytes at the current position.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Append the raw image of a binary-serializable scalar.
    ///
    /// Backends with direct access to their storage override this with a
    /// single-copy fast path.
    fn write_item<T: BinaryItem>(&mut self, item: T) {
        let mut image = [0u8; MAX_ITEM_SIZE];
        item.store(&mut image[..T::SIZE]);
        self.write_bytes(&image[..T::SIZE]);
    }
}

/// Source side of an archive.
pub trait Reader: Archive {
    /// Consume exactly `len` bytes, borrowing them from the input.
    fn read_bytes(&mut self, len: usize) -> Result<&[u8]>;

    /// Consume exactly `len` bytes into reference-counted memory.
    ///
    /// Readers over shared memory slice without copying; readers over
    /// borrowed memory copy.
    fn read_shared(&mut self, len: usize) -> Result<Bytes>;

    /// Look at the next `len` bytes without consuming them.
    fn peek_bytes(&self, len: usize) -> Result<&[u8]>;

    /// Bytes left before the end of the input.
    fn remaining(&self) -> usize;

    /// Largest container length this reader accepts.
    fn max_container_len(&self) -> usize;

    /// Consume the raw image of a binary-serializable scalar.
    fn read_item<T: BinaryItem>(&mut self) -> Result<T> {
        T::load(self.read_bytes(T::SIZE)?)
    }
}

/// Debug-check the invariant that an archive always has a valid version.
///
/// Called after every composite encode or decode.
#[inline]
pub fn check_version<A: Archive + ?Sized>(archive: &A) {
    debug_assert!(
        archive.protocol_version().is_valid(),
        "archive protocol version {} is not valid",
        archive.protocol_version()
    );
}
