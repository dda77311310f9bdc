use boda_crypto::{open_id, seal_id, IdHasher, IdKey, IdKeyring};
use boda_types::{NationalId, RiderId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn keyring() -> IdKeyring {
    IdKeyring::new(1, IdKey::new([0x5Au8; 32]))
}

fn seal_bench(c: &mut Criterion) {
    let ring = keyring();
    let rider = RiderId::new("DB-2025-0001");
    let id = NationalId::new("CF1234567890123");

    c.bench_function("seal_national_id", |b| {
        b.iter(|| seal_id(&ring, &rider, black_box(&id)))
    });
}

fn open_bench(c: &mut Criterion) {
    let ring = keyring();
    let rider = RiderId::new("DB-2025-0001");
    let sealed = seal_id(&ring, &rider, &NationalId::new("CF1234567890123")).unwrap();

    c.bench_function("open_national_id", |b| {
        b.iter(|| open_id(&ring, &rider, black_box(&sealed)))
    });
}

fn verification_hash_bench(c: &mut Criterion) {
    let hasher = IdHasher::new(vec![0xC3u8; 32]).unwrap();
    let id = NationalId::new("CM98765432109");

    c.bench_function("verification_hash", |b| {
        b.iter(|| hasher.hash(black_box(&id)))
    });
}

fn blake2b_multi_bench(c: &mut Criterion) {
    let parts: Vec<&[u8]> = vec![&[1u8; 32], b"boda-national-id-seal"];

    c.bench_function("blake2b_256_key_derivation", |b| {
        b.iter(|| boda_crypto::blake2b_256_multi(black_box(&parts)))
    });
}

criterion_group!(
    benches,
    seal_bench,
    open_bench,
    verification_hash_bench,
    blake2b_multi_bench,
);
criterion_main!(benches);
