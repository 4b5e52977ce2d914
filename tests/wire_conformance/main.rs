//! Wire Conformance Tests
//!
//! End-to-end checks of the externally visible wire format, organized by:
//! - Version negotiation: included, assumed, unversioned
//! - Scenarios: exact byte layouts of representative messages
//! - Backends: packet chains flatten to the contiguous encoding

mod backends;
mod scenarios;
mod versioning;

use strata_wire::{Decode, Encode};

/// Install a test log writer once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Sample message exercising scalars, strings, containers and options.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderReply {
    pub generation: u64,
    pub leader: Option<String>,
    pub members: Vec<(String, u16)>,
    pub healthy: bool,
}

strata_wire::wire_struct!(LeaderReply {
    generation,
    leader,
    members,
    healthy
});

pub fn sample_reply(members: usize) -> LeaderReply {
    LeaderReply {
        generation: 0x0102_0304,
        leader: Some("10.0.0.1:4500".to_string()),
        members: (0..members)
            .map(|i| (format!("10.0.0.{}:4500", i), 4500 + i as u16))
            .collect(),
        healthy: true,
    }
}

/// Assert that `T` survives encode then decode unchanged.
pub fn assert_roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(value: &T) {
    let policy = strata_wire::VersionPolicy::include_current();
    let bytes = strata_wire::BinaryWriter::encode_to_bytes(value, policy);
    let back: T = strata_wire::BinaryReader::decode_from(&bytes, policy).unwrap();
    assert_eq!(&back, value);
}
