//! Segmented packet writer
//!
//! `PacketWriter` appends into the tail buffer of a chain. A write that does
//! not fit the tail is split: the tail is filled, a new buffer is allocated
//! and linked, and the rest continues there until the value is placed. Every
//! buffer but the last of a chain is therefore exactly full.
//!
//! When a `ReliablePacket` is attached, the writer records the span of every
//! buffer the message touches and takes a reference on each. Unreliable
//! writers never touch it.

use smallvec::SmallVec;
use strata_codec::{Archive, BinaryItem, Writer};
use strata_core::{ProtocolVersion, VersionPolicy, WireConfig};

use crate::buffer::{BufferId, ChainPosition, Chunks, PacketSlab};
use crate::over_writer::OverWriter;
use crate::reliable::ReliablePacket;

/// One contiguous piece of a write-ahead reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedPiece {
    /// Buffer holding the piece.
    pub buffer: BufferId,
    /// Payload offset of the piece.
    pub offset: usize,
    /// Bytes in the piece.
    pub len: usize,
}

/// Bytes claimed in place, to be filled later by an `OverWriter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pieces: SmallVec<[ReservedPiece; 2]>,
    len: usize,
}

impl Reservation {
    /// Pieces in chain order.
    pub fn pieces(&self) -> &[ReservedPiece] {
        &self.pieces
    }

    /// Total reserved bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is reserved.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Chain produced by one writer, from its first byte to its last.
///
/// Buffers stay allocated until released; the chain only records where the
/// message lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketChain {
    head: BufferId,
    head_offset: usize,
    owns_head: bool,
    tail: BufferId,
    tail_end: usize,
    len: usize,
}

impl PacketChain {
    /// First buffer written.
    pub fn head(&self) -> BufferId {
        self.head
    }

    /// Offset in the head where this message starts.
    pub fn head_offset(&self) -> usize {
        self.head_offset
    }

    /// Last buffer written.
    pub fn tail(&self) -> BufferId {
        self.tail
    }

    /// Logical bytes written.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing was written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of the first byte.
    pub fn start(&self) -> ChainPosition {
        ChainPosition {
            buffer: self.head,
            offset: self.head_offset,
        }
    }

    /// Position one past the last byte.
    pub fn end(&self) -> ChainPosition {
        ChainPosition {
            buffer: self.tail,
            offset: self.tail_end,
        }
    }

    /// Payload slices of the message.
    pub fn chunks<'s>(&self, slab: &'s PacketSlab) -> Chunks<'s> {
        slab.chunks(self.start(), self.end())
    }

    /// Flatten the message into contiguous bytes.
    pub fn to_vec(&self, slab: &PacketSlab) -> Vec<u8> {
        slab.chain_bytes(self.start(), self.end())
    }

    /// Release the buffers this chain allocated.
    ///
    /// A head continued with `append_to` belongs to the earlier chain and is
    /// left alone.
    pub fn release(self, slab: &mut PacketSlab) {
        let mut current = Some(self.head);
        while let Some(id) = current {
            current = if id == self.tail {
                None
            } else {
                slab.get(id).next()
            };
            if id != self.head || self.owns_head {
                slab.release(id);
            }
        }
    }
}

/// Writer over a chain of packet buffers.
pub struct PacketWriter<'a> {
    slab: &'a mut PacketSlab,
    reliable: Option<&'a mut ReliablePacket>,
    head: BufferId,
    head_offset: usize,
    owns_head: bool,
    buffer: BufferId,
    length: usize,
    version: ProtocolVersion,
}

impl<'a> PacketWriter<'a> {
    /// Start a fresh chain for the given policy.
    pub fn new(
        slab: &'a mut PacketSlab,
        reliable: Option<&'a mut ReliablePacket>,
        policy: VersionPolicy,
    ) -> Self {
        Self::with_config(slab, reliable, &WireConfig::new(policy))
    }

    /// Start a fresh chain.
    pub fn with_config(
        slab: &'a mut PacketSlab,
        reliable: Option<&'a mut ReliablePacket>,
        config: &WireConfig,
    ) -> Self {
        let head = slab.alloc();
        Self::init(slab, head, true, reliable, config)
    }

    /// Continue writing at the fill level of an existing tail buffer.
    ///
    /// A full tail is left alone: the message starts in a fresh buffer
    /// linked after it, so no span or reference lands on the full one.
    pub fn append_to(
        slab: &'a mut PacketSlab,
        tail: BufferId,
        reliable: Option<&'a mut ReliablePacket>,
        config: &WireConfig,
    ) -> Self {
        if slab.get(tail).bytes_unwritten() == 0 {
            let next = slab.alloc();
            slab.link(tail, next);
            return Self::init(slab, next, true, reliable, config);
        }
        Self::init(slab, tail, false, reliable, config)
    }

    fn init(
        slab: &'a mut PacketSlab,
        head: BufferId,
        owns_head: bool,
        mut reliable: Option<&'a mut ReliablePacket>,
        config: &WireConfig,
    ) -> Self {
        let head_offset = slab.get(head).bytes_written();
        if let Some(rel) = reliable.as_deref_mut() {
            rel.begin_span(slab, head, head_offset);
        }
        let negotiated = config.policy.negotiate_write(config.default_version);
        let mut writer = PacketWriter {
            slab,
            reliable,
            head,
            head_offset,
            owns_head,
            buffer: head,
            length: 0,
            version: negotiated.version,
        };
        if let Some(header) = negotiated.header {
            writer.write_bytes(&header);
        }
        writer
    }

    /// Logical bytes written by this writer.
    pub fn size(&self) -> usize {
        self.length
    }

    /// Buffer currently being filled.
    pub fn tail(&self) -> BufferId {
        self.buffer
    }

    /// Position one past the last byte written.
    pub fn position(&self) -> ChainPosition {
        ChainPosition {
            buffer: self.buffer,
            offset: self.slab.get(self.buffer).bytes_written(),
        }
    }

    /// The slab this writer allocates from.
    pub fn slab(&self) -> &PacketSlab {
        self.slab
    }

    /// Claim `len` bytes in place, possibly across a boundary.
    ///
    /// The bytes count as written; fill them with `over_write`.
    pub fn write_ahead(&mut self, len: usize) -> Reservation {
        let mut pieces = SmallVec::new();
        let mut rest = len;
        loop {
            let buffer = self.slab.get_mut(self.buffer);
            let take = rest.min(buffer.bytes_unwritten());
            let offset = buffer.bytes_written();
            buffer.claim(take);
            if take > 0 {
                pieces.push(ReservedPiece {
                    buffer: self.buffer,
                    offset,
                    len: take,
                });
            }
            self.length += take;
            rest -= take;
            if rest == 0 {
                break;
            }
            self.next_buffer();
        }
        Reservation { pieces, len }
    }

    /// Fill a reservation made by this writer.
    pub fn over_write(&mut self, reservation: &Reservation) -> OverWriter<'_> {
        OverWriter::new(self.slab, reservation, self.version)
    }

    /// Seal the writer and hand back the chain it produced.
    pub fn finish(mut self) -> PacketChain {
        let tail_end = self.slab.get(self.buffer).bytes_written();
        if let Some(rel) = self.reliable.as_deref_mut() {
            rel.close_span(tail_end);
        }
        PacketChain {
            head: self.head,
            head_offset: self.head_offset,
            owns_head: self.owns_head,
            tail: self.buffer,
            tail_end,
            len: self.length,
        }
    }

    fn write_across_boundary(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        loop {
            let buffer = self.slab.get_mut(self.buffer);
            let take = rest.len().min(buffer.bytes_unwritten());
            buffer.append(&rest[..take]);
            self.length += take;
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
            self.next_buffer();
        }
    }

    fn next_buffer(&mut self) {
        let next = self.slab.alloc();
        self.slab.link(self.buffer, next);
        if let Some(rel) = self.reliable.as_deref_mut() {
            let end = self.slab.get(self.buffer).bytes_written();
            rel.close_span(end);
            rel.begin_span(self.slab, next, 0);
        }
        self.buffer = next;
    }
}

impl Archive for PacketWriter<'_> {
    fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }
}

impl Writer for PacketWriter<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        let buffer = self.slab.get_mut(self.buffer);
        if bytes.len() <= buffer.bytes_unwritten() {
            buffer.append(bytes);
            self.length += bytes.len();
        } else {
            self.write_across_boundary(bytes);
        }
    }

    fn write_item<T: BinaryItem>(&mut self, item: T) {
        let buffer = self.slab.get_mut(self.buffer);
        if T::SIZE <= buffer.bytes_unwritten() {
            item.store(buffer.claim(T::SIZE));
            self.length += T::SIZE;
        } else {
            let mut image = [0u8; strata_codec::MAX_ITEM_SIZE];
            item.store(&mut image[..T::SIZE]);
            self.write_across_boundary(&image[..T::SIZE]);
        }
    }
}
