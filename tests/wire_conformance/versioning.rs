//! Version Negotiation Tests

use std::io;
use std::sync::Arc;

use crate::{init_tracing, sample_reply, LeaderReply};
use parking_lot::Mutex;
use strata_wire::{
    Archive, ArenaReader, BinaryReader, BinaryWriter, Decode, Encode, ProtocolVersion, Reader,
    VersionPolicy, WireConfig, WireError, CURRENT_PROTOCOL_VERSION, MIN_VALID_PROTOCOL_VERSION,
};

fn encode_at(version: ProtocolVersion) -> bytes::Bytes {
    let config = WireConfig::new(VersionPolicy::Include(version));
    let mut w = BinaryWriter::with_config(&config);
    sample_reply(3).encode(&mut w);
    w.to_value()
}

#[test]
fn test_reader_one_version_behind_rejects() {
    init_tracing();
    let v = CURRENT_PROTOCOL_VERSION;
    let bytes = encode_at(v);
    let config = WireConfig::included()
        .with_max_supported_version(ProtocolVersion::new(v.version() - 1));

    let err = BinaryReader::with_config(&bytes, &config).unwrap_err();
    assert!(err.is_incompatible_version());
    assert_eq!(
        err,
        WireError::IncompatibleProtocolVersion {
            version: v.version_with_flags()
        }
    );
}

#[test]
fn test_reader_at_same_version_accepts() {
    let v = CURRENT_PROTOCOL_VERSION;
    let bytes = encode_at(v);
    let config = WireConfig::included().with_max_supported_version(v);

    let mut r = BinaryReader::with_config(&bytes, &config).unwrap();
    assert_eq!(r.protocol_version(), v);
    assert_eq!(LeaderReply::decode(&mut r).unwrap(), sample_reply(3));
    assert!(r.expect_end().is_ok());
}

#[test]
fn test_older_valid_version_accepted() {
    let bytes = encode_at(MIN_VALID_PROTOCOL_VERSION);
    let mut r = ArenaReader::new(bytes, VersionPolicy::include_current()).unwrap();
    assert_eq!(r.protocol_version(), MIN_VALID_PROTOCOL_VERSION);
    assert_eq!(LeaderReply::decode(&mut r).unwrap(), sample_reply(3));
}

#[test]
fn test_invalid_version_rejected() {
    init_tracing();
    let mut bytes = (MIN_VALID_PROTOCOL_VERSION.version() - 1).to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0; 16]);
    let err = BinaryReader::new(&bytes, VersionPolicy::include_current()).unwrap_err();
    assert!(err.is_incompatible_version());
}

#[test]
fn test_short_version_header() {
    let err = BinaryReader::new(&[1, 2, 3], VersionPolicy::include_current()).unwrap_err();
    assert_eq!(
        err,
        WireError::UnexpectedEof {
            needed: 8,
            remaining: 3
        }
    );
}

#[test]
fn test_flag_bits_ignored_by_gate() {
    let flagged = CURRENT_PROTOCOL_VERSION.with_object_serializer_flag();
    let mut bytes = flagged.to_le_bytes().to_vec();
    bytes.extend_from_slice(&5u32.to_le_bytes());

    let mut r = BinaryReader::new(&bytes, VersionPolicy::include_current()).unwrap();
    assert!(r.protocol_version().has_object_serializer_flag());
    assert_eq!(u32::decode(&mut r).unwrap(), 5);
}

#[test]
fn test_unversioned_never_reads_version_bytes() {
    let old = ProtocolVersion::new(MIN_VALID_PROTOCOL_VERSION.version() + 1);
    let bytes = BinaryWriter::encode_to_bytes(&sample_reply(2), VersionPolicy::Unversioned);

    let mut r = BinaryReader::new(&bytes, VersionPolicy::Assume(old)).unwrap();
    assert_eq!(r.remaining(), bytes.len());
    assert_eq!(r.protocol_version(), old);
    assert_eq!(LeaderReply::decode(&mut r).unwrap(), sample_reply(2));
}

#[test]
fn test_config_validation() {
    assert!(WireConfig::for_testing().validate().is_ok());
    let bad = WireConfig::unversioned().with_default_version(ProtocolVersion::new(1));
    assert!(bad.validate().is_err());
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs<F: FnOnce()>(f: F) -> String {
    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_writer(move || sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.contents()
}

#[test]
fn test_future_version_rejection_is_logged() {
    let v = CURRENT_PROTOCOL_VERSION;
    let bytes = encode_at(v);
    let config = WireConfig::included()
        .with_max_supported_version(ProtocolVersion::new(v.version() - 1));

    let logs = capture_logs(|| {
        assert!(BinaryReader::with_config(&bytes, &config)
            .unwrap_err()
            .is_incompatible_version());
    });
    assert!(logs.contains("ERROR"), "{}", logs);
    assert!(logs.contains("strata::wire"), "{}", logs);
    assert!(logs.contains("Future protocol version"), "{}", logs);
    assert!(logs.contains("0x0fdb00b061060001"), "{}", logs);
}

#[test]
fn test_invalid_version_rejection_is_logged() {
    let raw = MIN_VALID_PROTOCOL_VERSION.version() - 1;
    let mut bytes = raw.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0; 16]);

    let logs = capture_logs(|| {
        assert!(BinaryReader::new(&bytes, VersionPolicy::include_current())
            .unwrap_err()
            .is_incompatible_version());
    });
    assert!(logs.contains("Invalid serialization version"), "{}", logs);
    assert!(logs.contains(&format!("{:#018x}", raw)), "{}", logs);
    assert!(!logs.contains("Future protocol version"), "{}", logs);
}
