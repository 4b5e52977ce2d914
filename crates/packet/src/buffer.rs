//! Packet buffers and the slab that owns them
//!
//! A packet buffer is a fixed 4096-byte node: 28 bytes of bookkeeping and a
//! 4068-byte payload. Buffers live in a `PacketSlab` and are linked by index
//! into singly linked chains. Each buffer carries a reference count; the slab
//! recycles a buffer once its last owner releases it.
//!
//! All reference count operations take `&mut PacketSlab`, so they are
//! serialized by whoever holds the slab. A slab shared with a send or
//! retransmit task is wrapped in a `SharedPacketSlab`.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Size of one packet buffer node.
pub const PACKET_BUFFER_SIZE: usize = 4096;

/// Bookkeeping bytes of a packet buffer node.
pub const PACKET_HEADER_SIZE: usize = 28;

/// Payload bytes of a packet buffer node.
pub const PACKET_DATA_SIZE: usize = PACKET_BUFFER_SIZE - PACKET_HEADER_SIZE;

/// Slab shared between a writer and an asynchronous send path.
pub type SharedPacketSlab = Arc<Mutex<PacketSlab>>;

/// Index of a buffer within its slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u32);

impl BufferId {
    /// Slot index in the slab.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of a packet chain.
pub struct PacketBuffer {
    data: Box<[u8]>,
    bytes_written: usize,
    bytes_sent: usize,
    next: Option<BufferId>,
    refs: u32,
}

impl PacketBuffer {
    fn new() -> Self {
        PacketBuffer {
            data: vec![0u8; PACKET_DATA_SIZE].into_boxed_slice(),
            bytes_written: 0,
            bytes_sent: 0,
            next: None,
            refs: 0,
        }
    }

    /// Payload bytes filled so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Payload bytes handed to the transport so far.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Free payload space.
    pub fn bytes_unwritten(&self) -> usize {
        PACKET_DATA_SIZE - self.bytes_written
    }

    /// Filled payload.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.bytes_written]
    }

    /// Filled payload not yet sent.
    pub fn unsent(&self) -> &[u8] {
        &self.data[self.bytes_sent..self.bytes_written]
    }

    /// Next buffer in the chain.
    pub fn next(&self) -> Option<BufferId> {
        self.next
    }

    /// Current reference count.
    pub fn ref_count(&self) -> u32 {
        self.refs
    }

    /// True when no payload space is left.
    pub fn is_full(&self) -> bool {
        self.bytes_written == PACKET_DATA_SIZE
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        let end = self.bytes_written + bytes.len();
        self.data[self.bytes_written..end].copy_from_slice(bytes);
        self.bytes_written = end;
    }

    /// Claim `len` bytes at the fill level and return them for writing.
    pub(crate) fn claim(&mut self, len: usize) -> &mut [u8] {
        let start = self.bytes_written;
        self.bytes_written += len;
        &mut self.data[start..start + len]
    }

    /// Overwrite already-claimed bytes.
    pub(crate) fn overwrite(&mut self, offset: usize, bytes: &[u8]) {
        assert!(
            offset + bytes.len() <= self.bytes_written,
            "overwrite past the fill level of a packet buffer"
        );
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl fmt::Debug for PacketBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuffer")
            .field("bytes_written", &self.bytes_written)
            .field("bytes_sent", &self.bytes_sent)
            .field("next", &self.next)
            .field("refs", &self.refs)
            .finish()
    }
}

/// A position inside a chain: a buffer and a payload offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPosition {
    /// Buffer holding the position.
    pub buffer: BufferId,
    /// Payload offset within the buffer.
    pub offset: usize,
}

/// Pool of packet buffers.
#[derive(Debug, Default)]
pub struct PacketSlab {
    slots: Vec<PacketBuffer>,
    free: Vec<BufferId>,
}

impl PacketSlab {
    /// Create an empty slab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the slab for sharing with a send path.
    pub fn into_shared(self) -> SharedPacketSlab {
        Arc::new(Mutex::new(self))
    }

    /// Take an empty buffer with one reference.
    pub fn alloc(&mut self) -> BufferId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = BufferId(self.slots.len() as u32);
                self.slots.push(PacketBuffer::new());
                debug!(
                    target: "strata::packet",
                    buffers = self.slots.len(),
                    "Packet slab grew"
                );
                id
            }
        };
        let buffer = &mut self.slots[id.index()];
        buffer.bytes_written = 0;
        buffer.bytes_sent = 0;
        buffer.next = None;
        buffer.refs = 1;
        id
    }

    /// Add a reference to a live buffer.
    pub fn addref(&mut self, id: BufferId) {
        self.get_mut(id).refs += 1;
    }

    /// Drop a reference. Returns true if the buffer went back to the pool.
    pub fn release(&mut self, id: BufferId) -> bool {
        let buffer = self.get_mut(id);
        buffer.refs -= 1;
        if buffer.refs > 0 {
            return false;
        }
        buffer.next = None;
        self.free.push(id);
        true
    }

    /// Drop one reference on every buffer from `head` to the end of its chain.
    pub fn release_chain(&mut self, head: BufferId) {
        let mut current = Some(head);
        while let Some(id) = current {
            current = self.get(id).next;
            self.release(id);
        }
    }

    /// Access a live buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer has been released.
    pub fn get(&self, id: BufferId) -> &PacketBuffer {
        let buffer = &self.slots[id.index()];
        assert!(buffer.refs > 0, "packet buffer {} used after release", id);
        buffer
    }

    pub(crate) fn get_mut(&mut self, id: BufferId) -> &mut PacketBuffer {
        let buffer = &mut self.slots[id.index()];
        assert!(buffer.refs > 0, "packet buffer {} used after release", id);
        buffer
    }

    /// Link `next` after `prev`.
    pub fn link(&mut self, prev: BufferId, next: BufferId) {
        self.get_mut(prev).next = Some(next);
    }

    /// Record that `n` more bytes of `id` were handed to the transport.
    ///
    /// # Panics
    ///
    /// Panics if that would pass the fill level.
    pub fn record_sent(&mut self, id: BufferId, n: usize) {
        let buffer = self.get_mut(id);
        assert!(
            buffer.bytes_sent + n <= buffer.bytes_written,
            "sent bytes pass the fill level of packet buffer {}",
            id
        );
        buffer.bytes_sent += n;
    }

    /// Buffers currently holding at least one reference.
    pub fn live_buffers(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Buffers ever allocated by this slab.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate the chain starting at `head`.
    pub fn chain(&self, head: BufferId) -> ChainIter<'_> {
        ChainIter {
            slab: self,
            next: Some(head),
        }
    }

    /// Iterate the payload between two positions of one chain.
    pub fn chunks(&self, from: ChainPosition, to: ChainPosition) -> Chunks<'_> {
        Chunks {
            slab: self,
            next: Some(from),
            to,
        }
    }

    /// Copy the payload between two positions of one chain.
    pub fn chain_bytes(&self, from: ChainPosition, to: ChainPosition) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in self.chunks(from, to) {
            out.extend_from_slice(chunk);
        }
        out
    }
}

/// Iterator over the buffers of a chain.
pub struct ChainIter<'s> {
    slab: &'s PacketSlab,
    next: Option<BufferId>,
}

impl<'s> Iterator for ChainIter<'s> {
    type Item = (BufferId, &'s PacketBuffer);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let buffer = self.slab.get(id);
        self.next = buffer.next;
        Some((id, buffer))
    }
}

/// Iterator over payload slices between two chain positions.
pub struct Chunks<'s> {
    slab: &'s PacketSlab,
    next: Option<ChainPosition>,
    to: ChainPosition,
}

impl<'s> Iterator for Chunks<'s> {
    type Item = &'s [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.next?;
        let buffer = self.slab.get(at.buffer);
        let end = if at.buffer == self.to.buffer {
            self.next = None;
            self.to.offset
        } else {
            self.next = buffer.next.map(|buffer| ChainPosition { buffer, offset: 0 });
            buffer.bytes_written
        };
        Some(&buffer.data[at.offset..end])
    }
}
