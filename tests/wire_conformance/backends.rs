//! Backend Equivalence Tests

use crate::{sample_reply, LeaderReply};
use proptest::prelude::*;
use strata_wire::{
    enqueue, read_frame, write_framed, ArenaReader, BinaryReader, BinaryWriter, BoolAndSource,
    Decode, Encode, PacketSlab, PacketWriter, ReliablePacket, SerializeSource, UnsentQueue,
    ValueSource, VersionPolicy, WireConfig, Writer, PACKET_DATA_SIZE,
};

#[test]
fn test_packet_chain_matches_contiguous() {
    let reply = sample_reply(400);
    let policy = VersionPolicy::include_current();

    let mut slab = PacketSlab::new();
    let mut w = PacketWriter::new(&mut slab, None, policy);
    reply.encode(&mut w);
    let chain = w.finish();
    assert!(chain.len() > PACKET_DATA_SIZE);

    let contiguous = BinaryWriter::encode_to_bytes(&reply, policy);
    assert_eq!(chain.to_vec(&slab), &contiguous[..]);

    let fills: Vec<usize> = slab
        .chain(chain.head())
        .map(|(_, b)| b.bytes_written())
        .collect();
    let (_, full) = fills.split_last().unwrap();
    assert!(full.iter().all(|&n| n == PACKET_DATA_SIZE));

    chain.release(&mut slab);
    assert_eq!(slab.live_buffers(), 0);
}

#[test]
fn test_5000_byte_payload_layout() {
    let mut slab = PacketSlab::new();
    let mut w = PacketWriter::new(&mut slab, None, VersionPolicy::Unversioned);
    w.write_bytes(&vec![0x42; 5000]);
    let chain = w.finish();

    let fills: Vec<usize> = slab
        .chain(chain.head())
        .map(|(_, b)| b.bytes_written())
        .collect();
    assert_eq!(fills, vec![4068, 932]);
}

#[test]
fn test_sources_choose_encoding_at_send_time() {
    let reply = sample_reply(2);
    let sources: Vec<Box<dyn SerializeSource + '_>> = vec![
        Box::new(ValueSource::new(&reply)),
        Box::new(BoolAndSource::new(true, &reply)),
    ];

    let mut slab = PacketSlab::new();
    let mut queue = UnsentQueue::new();
    let config = WireConfig::unversioned();
    let mut total = 0;
    for source in &sources {
        total += enqueue(&mut queue, &mut slab, None, &config, source.as_ref());
    }

    let mut sent = Vec::new();
    while let Some(chunk) = queue.next_chunk(&slab).map(|c| c.to_vec()) {
        sent.extend_from_slice(&chunk);
        queue.sent(&mut slab, chunk.len());
    }
    assert_eq!(sent.len(), total);

    let mut r = BinaryReader::new(&sent, VersionPolicy::Unversioned).unwrap();
    assert_eq!(LeaderReply::decode(&mut r).unwrap(), reply);
    assert!(bool::decode(&mut r).unwrap());
    assert_eq!(LeaderReply::decode(&mut r).unwrap(), reply);
    assert!(r.expect_end().is_ok());

    let contiguous = sources[0].to_value(VersionPolicy::Unversioned);
    assert_eq!(&sent[..contiguous.len()], &contiguous[..]);
}

#[test]
fn test_framed_reliable_replay() {
    let reply = sample_reply(300);
    let mut slab = PacketSlab::new();
    let mut reliable = ReliablePacket::new();

    let mut w = PacketWriter::new(&mut slab, Some(&mut reliable), VersionPolicy::Unversioned);
    write_framed(&mut w, |w| reply.encode(w));
    let chain = w.finish();
    chain.release(&mut slab);

    let replay = bytes::Bytes::from(reliable.to_vec(&slab));
    let mut r = ArenaReader::new(replay, VersionPolicy::Unversioned).unwrap();
    let payload = read_frame(&mut r).unwrap();
    let back: LeaderReply = BinaryReader::decode_from(&payload, VersionPolicy::Unversioned).unwrap();
    assert_eq!(back, reply);

    reliable.release(&mut slab);
    assert_eq!(slab.live_buffers(), 0);
}

fn arb_reply() -> impl Strategy<Value = LeaderReply> {
    (
        any::<u64>(),
        proptest::option::of("[a-z0-9.:]{0,24}"),
        proptest::collection::vec(("[a-z0-9.:]{0,40}", any::<u16>()), 0..300),
        any::<bool>(),
    )
        .prop_map(|(generation, leader, members, healthy)| LeaderReply {
            generation,
            leader,
            members,
            healthy,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_packet_chain_flattens_to_contiguous(
        reply in arb_reply(),
        prefix in 0usize..PACKET_DATA_SIZE,
    ) {
        let policy = VersionPolicy::include_current();
        let contiguous = BinaryWriter::encode_to_bytes(&reply, policy);

        // An unrelated message first puts the boundary at a random offset.
        let mut slab = PacketSlab::new();
        let mut w = PacketWriter::new(&mut slab, None, VersionPolicy::Unversioned);
        w.write_bytes(&vec![0xEE; prefix]);
        let filler = w.finish();

        let mut w = PacketWriter::append_to(&mut slab, filler.tail(), None, &WireConfig::from(policy));
        reply.encode(&mut w);
        let chain = w.finish();

        let flat = chain.to_vec(&slab);
        prop_assert_eq!(&flat[..], &contiguous[..]);
        let back: LeaderReply = BinaryReader::decode_from(&flat, policy).unwrap();
        prop_assert_eq!(back, reply);

        chain.release(&mut slab);
        filler.release(&mut slab);
        prop_assert_eq!(slab.live_buffers(), 0);
    }
}
