//! Type-erased serialization sources
//!
//! A queued message is held as a `&dyn SerializeSource` so the transport can
//! pick the encoding when it transmits, not when the message is built. The
//! target set is closed: a contiguous `BinaryWriter` or a `PacketWriter`.

use bytes::Bytes;
use strata_codec::{Archive, BinaryWriter, Encode, ProtocolVersion, VersionPolicy, WireConfig};
use strata_packet::{PacketSlab, PacketWriter, ReliablePacket, UnsentQueue};
use tracing::trace;

/// Archive a source writes into.
pub enum SerializeTarget<'t, 's> {
    /// Contiguous in-memory writer.
    Binary(&'t mut BinaryWriter),
    /// Segmented packet writer.
    Packet(&'t mut PacketWriter<'s>),
}

impl SerializeTarget<'_, '_> {
    /// Encode `value` at the target's current position.
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) {
        match self {
            SerializeTarget::Binary(w) => value.encode(&mut **w),
            SerializeTarget::Packet(w) => value.encode(&mut **w),
        }
    }

    /// Ambient protocol version of the target.
    pub fn protocol_version(&self) -> ProtocolVersion {
        match self {
            SerializeTarget::Binary(w) => w.protocol_version(),
            SerializeTarget::Packet(w) => w.protocol_version(),
        }
    }
}

/// A value that can be encoded into any target.
pub trait SerializeSource {
    /// Encode into `target`.
    fn write_to(&self, target: SerializeTarget<'_, '_>);

    /// Encode into a fresh contiguous writer and finalize it.
    fn to_value(&self, policy: VersionPolicy) -> Bytes {
        let mut w = BinaryWriter::new(policy);
        self.write_to(SerializeTarget::Binary(&mut w));
        w.to_value()
    }
}

/// Source that defers to the value's own `Encode`.
#[derive(Debug, Clone, Copy)]
pub struct ValueSource<'v, T: ?Sized> {
    value: &'v T,
}

impl<'v, T: Encode + ?Sized> ValueSource<'v, T> {
    /// Bind `value`.
    pub fn new(value: &'v T) -> Self {
        ValueSource { value }
    }

    /// The bound value.
    pub fn get(&self) -> &'v T {
        self.value
    }
}

impl<T: Encode + ?Sized> SerializeSource for ValueSource<'_, T> {
    fn write_to(&self, mut target: SerializeTarget<'_, '_>) {
        target.write(self.value);
    }
}

/// Source that writes a bool flag ahead of the value.
///
/// Used to signal continuation or validity without a separate message.
#[derive(Debug, Clone, Copy)]
pub struct BoolAndSource<'v, T: ?Sized> {
    flag: bool,
    value: &'v T,
}

impl<'v, T: Encode + ?Sized> BoolAndSource<'v, T> {
    /// Bind `flag` and `value`.
    pub fn new(flag: bool, value: &'v T) -> Self {
        BoolAndSource { flag, value }
    }

    /// The flag written first.
    pub fn flag(&self) -> bool {
        self.flag
    }
}

impl<T: Encode + ?Sized> SerializeSource for BoolAndSource<'_, T> {
    fn write_to(&self, mut target: SerializeTarget<'_, '_>) {
        target.write(&self.flag);
        target.write(self.value);
    }
}

/// Append `source` to `queue` as one message. Returns its length.
pub fn enqueue(
    queue: &mut UnsentQueue,
    slab: &mut PacketSlab,
    reliable: Option<&mut ReliablePacket>,
    config: &WireConfig,
    source: &dyn SerializeSource,
) -> usize {
    let len = queue.write_with(slab, reliable, config, |w| {
        source.write_to(SerializeTarget::Packet(w))
    });
    trace!(target: "strata::wire", len, "Source enqueued");
    len
}
