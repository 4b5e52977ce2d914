//! Wire Encoding Benchmarks
//!
//! ## Benchmark Path Types
//!
//! - `binary_*`: contiguous `BinaryWriter` / `BinaryReader`
//! - `packet_*`: segmented `PacketWriter` over a reused slab
//! - `tuple_*`: ordered-key encoding
//!
//! ## What These Benchmarks Prove
//!
//! | Benchmark | Guarantee | Regression Detection |
//! |-----------|-----------|----------------------|
//! | binary_encode/* | Size-class growth, single copy per write | Reallocation churn |
//! | binary_decode/* | Bounds-checked reads, capped reservation | Per-field overhead |
//! | packet_encode/* | Fast path inside a buffer, split only at boundaries | Boundary slow path |
//! | tuple_encode | Minimal-width big-endian keys | Key encoding cost |
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench wire_encoding
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use strata_wire::{
    BinaryReader, BinaryWriter, Decode, Encode, PacketSlab, PacketWriter, TupleWrite,
    VersionPolicy,
};

const BENCH_SEED: u64 = 0x5EED;

fn message(entries: usize) -> Vec<(u64, String)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(BENCH_SEED);
    (0..entries)
        .map(|i| (rng.gen(), format!("member-{}", i)))
        .collect()
}

fn binary_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_encode");
    for entries in [8usize, 256, 4096] {
        let value = message(entries);
        let policy = VersionPolicy::include_current();
        let size = BinaryWriter::encode_to_bytes(&value, policy).len();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &value, |b, value| {
            b.iter(|| black_box(BinaryWriter::encode_to_bytes(value, policy)))
        });
    }
    group.finish();
}

fn binary_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_decode");
    for entries in [8usize, 256, 4096] {
        let bytes = BinaryWriter::encode_to_bytes(&message(entries), VersionPolicy::Unversioned);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &bytes, |b, bytes| {
            b.iter(|| {
                let mut r = BinaryReader::new(bytes, VersionPolicy::Unversioned).unwrap();
                black_box(Vec::<(u64, String)>::decode(&mut r).unwrap())
            })
        });
    }
    group.finish();
}

fn packet_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode");
    for entries in [8usize, 256, 4096] {
        let value = message(entries);
        let policy = VersionPolicy::include_current();
        let size = BinaryWriter::encode_to_bytes(&value, policy).len();
        group.throughput(Throughput::Bytes(size as u64));
        let mut slab = PacketSlab::new();
        group.bench_with_input(BenchmarkId::from_parameter(entries), &value, |b, value| {
            b.iter(|| {
                let mut w = PacketWriter::new(&mut slab, None, policy);
                value.encode(&mut w);
                let chain = w.finish();
                black_box(chain.len());
                chain.release(&mut slab);
            })
        });
    }
    group.finish();
}

fn tuple_encode(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(BENCH_SEED);
    let keys: Vec<i64> = (0..1024).map(|_| rng.gen()).collect();
    let mut group = c.benchmark_group("tuple_encode");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("i64_keys", |b| {
        b.iter(|| {
            let mut w = BinaryWriter::new(VersionPolicy::Unversioned);
            for &key in &keys {
                w.write_tuple_i64(key);
            }
            black_box(w.to_value())
        })
    });
    group.finish();
}

criterion_group!(benches, binary_encode, binary_decode, packet_encode, tuple_encode);
criterion_main!(benches);
