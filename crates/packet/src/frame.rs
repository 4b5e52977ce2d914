//! Checksummed message framing
//!
//! # Frame Format
//!
//! ```text
//! ┌──────────────────┬──────────────────┬─────────────────┐
//! │ Length (4, LE)   │ CRC32 (4, LE)    │ Payload         │
//! └──────────────────┴──────────────────┴─────────────────┘
//! ```
//!
//! Length and CRC cover the payload only. The header is reserved with
//! `write_ahead` before the payload is written and back-filled afterwards,
//! so the payload is encoded straight into the chain.

use bytes::Bytes;
use crc32fast::Hasher;
use strata_codec::{Reader, Writer};
use strata_core::{Result, WireError};
use tracing::warn;

use crate::writer::PacketWriter;

/// Bytes of frame header before the payload.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Write one frame whose payload is produced by `body`. Returns the payload length.
///
/// # Panics
///
/// Panics if the payload exceeds `u32::MAX` bytes.
pub fn write_framed<F>(w: &mut PacketWriter<'_>, body: F) -> usize
where
    F: FnOnce(&mut PacketWriter<'_>),
{
    let header = w.write_ahead(FRAME_HEADER_SIZE);
    let start = w.position();
    let before = w.size();

    body(&mut *w);

    let len = w.size() - before;
    assert!(
        len <= u32::MAX as usize,
        "frame payload of {} bytes exceeds u32::MAX",
        len
    );
    let mut hasher = Hasher::new();
    for chunk in w.slab().chunks(start, w.position()) {
        hasher.update(chunk);
    }
    let checksum = hasher.finalize();

    let mut over = w.over_write(&header);
    over.write_item(len as u32);
    over.write_item(checksum);
    len
}

/// Read one frame and verify its checksum.
///
/// The payload is returned through `Reader::read_shared`, so it shares
/// memory with an `ArenaReader`'s input.
pub fn read_frame<R: Reader>(r: &mut R) -> Result<Bytes> {
    let len = r.read_item::<u32>()? as usize;
    let expected = r.read_item::<u32>()?;
    let max = r.max_container_len();
    if len > max {
        return Err(WireError::LengthLimitExceeded { len, max });
    }
    let payload = r.read_shared(len)?;
    let actual = crc32fast::hash(&payload);
    if actual != expected {
        warn!(
            target: "strata::packet",
            len,
            expected,
            actual,
            "Frame checksum mismatch"
        );
        return Err(WireError::ChecksumMismatch { expected, actual });
    }
    Ok(payload)
}
