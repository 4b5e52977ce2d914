//! Outbound queue with partial transmission
//!
//! Messages are appended to one chain. The transport takes the unsent bytes
//! of the front buffer, reports how many it managed to send, and the queue
//! advances `bytes_sent` in place. Buffers are released as soon as they are
//! fully sent and will not receive more data; nothing is ever recopied.

use strata_core::WireConfig;
use tracing::trace;

use crate::buffer::{BufferId, PacketSlab};
use crate::reliable::ReliablePacket;
use crate::writer::PacketWriter;

/// Chain of buffers waiting to be sent.
#[derive(Debug, Default)]
pub struct UnsentQueue {
    front: Option<BufferId>,
    back: Option<BufferId>,
    unsent_bytes: usize,
}

impl UnsentQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes queued but not yet sent.
    pub fn unsent_bytes(&self) -> usize {
        self.unsent_bytes
    }

    /// True when nothing is waiting to be sent.
    pub fn is_empty(&self) -> bool {
        self.unsent_bytes == 0
    }

    /// Front buffer of the queue.
    pub fn front(&self) -> Option<BufferId> {
        self.front
    }

    /// Append one message written by `write`. Returns its length.
    pub fn write_with<F>(
        &mut self,
        slab: &mut PacketSlab,
        reliable: Option<&mut ReliablePacket>,
        config: &WireConfig,
        write: F,
    ) -> usize
    where
        F: FnOnce(&mut PacketWriter<'_>),
    {
        let mut writer = match self.back {
            Some(tail) => PacketWriter::append_to(slab, tail, reliable, config),
            None => PacketWriter::with_config(slab, reliable, config),
        };
        write(&mut writer);
        let chain = writer.finish();

        if self.front.is_none() {
            self.front = Some(chain.head());
        }
        self.back = Some(chain.tail());
        self.unsent_bytes += chain.len();
        trace!(
            target: "strata::packet",
            len = chain.len(),
            unsent = self.unsent_bytes,
            "Message queued"
        );
        chain.len()
    }

    /// Unsent bytes of the front buffer.
    pub fn next_chunk<'s>(&self, slab: &'s PacketSlab) -> Option<&'s [u8]> {
        let front = slab.get(self.front?).unsent();
        if front.is_empty() {
            None
        } else {
            Some(front)
        }
    }

    /// Record that the transport sent `n` bytes from the front.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the unsent bytes.
    pub fn sent(&mut self, slab: &mut PacketSlab, n: usize) {
        assert!(
            n <= self.unsent_bytes,
            "sent {} bytes but only {} are queued",
            n,
            self.unsent_bytes
        );
        let mut rest = n;
        while let Some(front) = self.front {
            let buffer = slab.get(front);
            let take = rest.min(buffer.unsent().len());
            slab.record_sent(front, take);
            rest -= take;
            self.unsent_bytes -= take;

            let buffer = slab.get(front);
            let done = buffer.unsent().is_empty() && (buffer.is_full() || buffer.next().is_some());
            if !done {
                debug_assert_eq!(rest, 0);
                break;
            }
            self.front = buffer.next();
            slab.release(front);
            trace!(target: "strata::packet", buffer = %front, "Packet buffer sent");
            if self.front.is_none() {
                self.back = None;
            }
        }
        trace!(
            target: "strata::packet",
            sent = n,
            unsent = self.unsent_bytes,
            "Send progress"
        );
    }

    /// Drop everything still queued.
    pub fn discard_all(&mut self, slab: &mut PacketSlab) {
        if let Some(front) = self.front.take() {
            slab.release_chain(front);
        }
        self.back = None;
        self.unsent_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PACKET_DATA_SIZE;
    use strata_codec::{Encode, Writer};

    #[test]
    fn test_partial_sends_release_full_buffers() {
        let mut slab = PacketSlab::new();
        let mut queue = UnsentQueue::new();
        let config = WireConfig::unversioned();

        let len = queue.write_with(&mut slab, None, &config, |w| w.write_bytes(&[9u8; 5000]));
        assert_eq!(len, 5000);
        assert_eq!(queue.unsent_bytes(), 5000);
        assert_eq!(slab.live_buffers(), 2);

        assert_eq!(queue.next_chunk(&slab).map(<[u8]>::len), Some(PACKET_DATA_SIZE));
        queue.sent(&mut slab, 1000);
        assert_eq!(
            queue.next_chunk(&slab).map(<[u8]>::len),
            Some(PACKET_DATA_SIZE - 1000)
        );

        queue.sent(&mut slab, PACKET_DATA_SIZE - 1000);
        assert_eq!(slab.live_buffers(), 1);
        assert_eq!(queue.next_chunk(&slab).map(<[u8]>::len), Some(932));

        queue.sent(&mut slab, 932);
        assert!(queue.is_empty());
        assert!(queue.next_chunk(&slab).is_none());
        // A partially filled tail stays to receive the next message.
        assert_eq!(slab.live_buffers(), 1);

        queue.write_with(&mut slab, None, &config, |w| 7u32.encode(w));
        assert_eq!(queue.next_chunk(&slab), Some(&[7u8, 0, 0, 0][..]));

        queue.discard_all(&mut slab);
        assert_eq!(slab.live_buffers(), 0);
    }

    #[test]
    fn test_send_spanning_buffers() {
        let mut slab = PacketSlab::new();
        let mut queue = UnsentQueue::new();
        let config = WireConfig::unversioned();

        queue.write_with(&mut slab, None, &config, |w| w.write_bytes(&[1u8; 9000]));
        assert_eq!(slab.live_buffers(), 3);

        queue.sent(&mut slab, PACKET_DATA_SIZE * 2 + 10);
        assert_eq!(slab.live_buffers(), 1);
        assert_eq!(queue.unsent_bytes(), 9000 - PACKET_DATA_SIZE * 2 - 10);
    }

    #[test]
    fn test_reliable_survives_send() {
        let mut slab = PacketSlab::new();
        let mut queue = UnsentQueue::new();
        let mut reliable = ReliablePacket::new();
        let config = WireConfig::unversioned();

        queue.write_with(&mut slab, Some(&mut reliable), &config, |w| {
            w.write_bytes(&[5u8; PACKET_DATA_SIZE]);
        });
        queue.sent(&mut slab, PACKET_DATA_SIZE);
        assert!(queue.is_empty());

        assert_eq!(reliable.to_vec(&slab), vec![5u8; PACKET_DATA_SIZE]);
        reliable.release(&mut slab);
        assert_eq!(slab.live_buffers(), 0);
    }

    #[test]
    #[should_panic(expected = "only 3 are queued")]
    fn test_oversend_panics() {
        let mut slab = PacketSlab::new();
        let mut queue = UnsentQueue::new();
        queue.write_with(&mut slab, None, &WireConfig::unversioned(), |w| {
            w.write_bytes(b"abc")
        });
        queue.sent(&mut slab, 4);
    }
}
