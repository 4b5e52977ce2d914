//! Reliable-delivery bookkeeping
//!
//! A `ReliablePacket` records where one message lives inside a buffer chain:
//! one span per buffer the message touches. Each span holds a reference on
//! its buffer, so a retransmission layer can replay the message after the
//! send queue has released those buffers.

use smallvec::SmallVec;

use crate::buffer::{BufferId, PacketSlab};

/// The part of one buffer occupied by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReliableSpan {
    /// Buffer holding the span.
    pub buffer: BufferId,
    /// First payload byte of the span.
    pub begin: usize,
    /// One past the last payload byte of the span.
    pub end: usize,
}

impl ReliableSpan {
    /// Bytes covered by the span.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// True when the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Handle a packet writer updates as it fills buffers.
#[derive(Debug, Default)]
pub struct ReliablePacket {
    spans: SmallVec<[ReliableSpan; 2]>,
}

impl ReliablePacket {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a span at `begin` in `buffer`, taking a reference on it.
    pub fn begin_span(&mut self, slab: &mut PacketSlab, buffer: BufferId, begin: usize) {
        slab.addref(buffer);
        self.spans.push(ReliableSpan {
            buffer,
            begin,
            end: begin,
        });
    }

    /// Close the most recent span at `end`.
    pub fn close_span(&mut self, end: usize) {
        if let Some(span) = self.spans.last_mut() {
            debug_assert!(end >= span.begin, "span closed before it began");
            span.end = end;
        }
    }

    /// Recorded spans, in chain order.
    pub fn spans(&self) -> &[ReliableSpan] {
        &self.spans
    }

    /// Message bytes covered by all spans.
    pub fn len(&self) -> usize {
        self.spans.iter().map(ReliableSpan::len).sum()
    }

    /// True when no bytes are covered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload slices to replay, in order.
    pub fn chunks<'s>(&'s self, slab: &'s PacketSlab) -> impl Iterator<Item = &'s [u8]> + 's {
        self.spans
            .iter()
            .map(move |span| &slab.get(span.buffer).written()[span.begin..span.end])
    }

    /// Copy the message out for replay.
    pub fn to_vec(&self, slab: &PacketSlab) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks(slab) {
            out.extend_from_slice(chunk);
        }
        out
    }

    /// Drop the references held by every span.
    pub fn release(&mut self, slab: &mut PacketSlab) {
        for span in self.spans.drain(..) {
            slab.release(span.buffer);
        }
    }
}
