//! Segmented packet chains for the Strata wire protocol
//!
//! Outbound messages are written into chains of fixed-size, reference-counted
//! buffers so filled buffers can be handed to the transport before the rest
//! of the message exists, and partially sent buffers are never recopied.
//!
//! - PacketSlab / PacketBuffer: buffer pool with index-linked chains
//! - PacketWriter: boundary-crossing writer over a chain
//! - ReliablePacket: spans a retransmission layer can replay
//! - OverWriter: fills bytes reserved with `write_ahead`
//! - UnsentQueue: partial transmission with in-place send progress
//! - frame: length + CRC32 framing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod frame;
pub mod over_writer;
pub mod queue;
pub mod reliable;
pub mod writer;

pub use buffer::{
    BufferId, ChainIter, ChainPosition, Chunks, PacketBuffer, PacketSlab, SharedPacketSlab,
    PACKET_BUFFER_SIZE, PACKET_DATA_SIZE, PACKET_HEADER_SIZE,
};
pub use frame::{read_frame, write_framed, FRAME_HEADER_SIZE};
pub use over_writer::OverWriter;
pub use queue::UnsentQueue;
pub use reliable::{ReliablePacket, ReliableSpan};
pub use writer::{PacketChain, PacketWriter, Reservation, ReservedPiece};
