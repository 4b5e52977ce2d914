//! Fixed-capacity writer over a reservation
//!
//! Fills bytes claimed earlier with `PacketWriter::write_ahead`, such as a
//! length or checksum that is only known once the body has been written.

use smallvec::SmallVec;
use strata_codec::{Archive, Writer};
use strata_core::ProtocolVersion;

use crate::buffer::PacketSlab;
use crate::writer::{Reservation, ReservedPiece};

/// Writer over the pieces of a `Reservation`.
///
/// Writing more than the reserved length is a contract violation and panics.
pub struct OverWriter<'s> {
    slab: &'s mut PacketSlab,
    pieces: SmallVec<[ReservedPiece; 2]>,
    piece: usize,
    filled: usize,
    remaining: usize,
    version: ProtocolVersion,
}

impl<'s> OverWriter<'s> {
    /// Create a writer over `reservation`.
    pub fn new(
        slab: &'s mut PacketSlab,
        reservation: &Reservation,
        version: ProtocolVersion,
    ) -> Self {
        OverWriter {
            slab,
            pieces: SmallVec::from_slice(reservation.pieces()),
            piece: 0,
            filled: 0,
            remaining: reservation.len(),
            version,
        }
    }

    /// Reserved bytes not yet filled.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Archive for OverWriter<'_> {
    fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }
}

impl Writer for OverWriter<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= self.remaining,
            "over-write of {} bytes exceeds the {} reserved bytes left",
            bytes.len(),
            self.remaining
        );
        let mut rest = bytes;
        while !rest.is_empty() {
            let piece = self.pieces[self.piece];
            let take = rest.len().min(piece.len - self.filled);
            self.slab
                .get_mut(piece.buffer)
                .overwrite(piece.offset + self.filled, &rest[..take]);
            self.filled += take;
            rest = &rest[take..];
            if self.filled == piece.len {
                self.piece += 1;
                self.filled = 0;
            }
        }
        self.remaining -= bytes.len();
    }
}
