//! Byte Layout Scenarios

use crate::{assert_roundtrip, sample_reply};
use strata_wire::{
    BinaryReader, BinaryWriter, Decode, Encode, TupleWrite, VersionPolicy, WireError, Writer,
    CURRENT_PROTOCOL_VERSION,
};

#[test]
fn test_u32_then_string_layout() {
    let mut w = BinaryWriter::new(VersionPolicy::include_current());
    300u32.encode(&mut w);
    "ab".encode(&mut w);
    let bytes = w.to_value();

    let mut expected = CURRENT_PROTOCOL_VERSION.to_le_bytes().to_vec();
    expected.extend_from_slice(&[0x2C, 0x01, 0x00, 0x00]);
    expected.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'a', b'b']);
    assert_eq!(&bytes[..], &expected[..]);
}

#[test]
fn test_max_length_prefix() {
    let mut w = BinaryWriter::new(VersionPolicy::Unversioned);
    strata_wire::encode_len(&mut w, 2_147_483_647);
    assert_eq!(w.as_bytes(), &[0xFF, 0xFF, 0xFF, 0x7F]);
}

#[test]
fn test_negative_length_rejected() {
    let bytes = (-7i32).to_le_bytes();
    let mut r = BinaryReader::new(&bytes, VersionPolicy::Unversioned).unwrap();
    assert_eq!(String::decode(&mut r), Err(WireError::NegativeLength(-7)));
}

#[test]
fn test_ordered_key_layout() {
    let mut w = BinaryWriter::new(VersionPolicy::Unversioned);
    w.write_tuple_bool(false);
    w.write_tuple_bool(true);
    w.write_tuple_i64(0);
    w.write_tuple_i64(-1);
    w.write_tuple_u64(0x1234);
    w.write_tuple_bytes(b"a\0");
    assert_eq!(
        w.as_bytes(),
        &[
            0x14, 0x15, 0x01, 0x14, 0x13, 0xFE, 0x16, 0x12, 0x34, 0x01, b'a', 0x00, 0xFF, 0x00
        ]
    );
}

#[test]
fn test_reader_stops_at_end() {
    let bytes = BinaryWriter::encode_to_bytes(&sample_reply(4), VersionPolicy::Unversioned);
    for cut in [0, 1, 8, bytes.len() / 2, bytes.len() - 1] {
        let mut r = BinaryReader::new(&bytes[..cut], VersionPolicy::Unversioned).unwrap();
        assert!(crate::LeaderReply::decode(&mut r).is_err());
    }
}

#[test]
fn test_checkpoint_speculative_parse() {
    let mut w = BinaryWriter::new(VersionPolicy::Unversioned);
    w.write_item(2u8);
    "two".encode(&mut w);
    let bytes = w.to_value();

    let mut r = BinaryReader::new(&bytes, VersionPolicy::Unversioned).unwrap();
    r.checkpoint();
    assert!(bool::decode(&mut r).is_err());
    r.rewind();
    assert_eq!(u8::decode(&mut r).unwrap(), 2);
    assert_eq!(String::decode(&mut r).unwrap(), "two");
}

#[test]
fn test_message_roundtrips() {
    assert_roundtrip(&sample_reply(0));
    assert_roundtrip(&sample_reply(64));
    assert_roundtrip(&(1u8, -1i64, 2.5f64, String::from("x")));
}
