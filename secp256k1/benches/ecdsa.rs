//! secp256k1 signature benchmarks

use coinlib_secp256k1::{All, Context, SecretKey, ecdsa};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hex_literal::hex;

fn test_secret_key() -> SecretKey {
    SecretKey::from_bytes(&hex!(
        "bb488aef416a41d7680d1cf01d70f59b60d7f5f77e30e78b8bf9d2d882f156a6"
    ))
    .unwrap()
}

const TEST_DIGEST: [u8; 32] =
    hex!("e33580eb6ed022aed6af20d92237635e7c20c5f1bcd6aee88182ed7180f6e267");

fn bench_ecdsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa");

    let d = test_secret_key();
    let z = TEST_DIGEST;

    group.bench_function("sign_prehash", |b| {
        b.iter(|| ecdsa::sign_prehash(black_box(&d), &black_box(z)).unwrap())
    });

    let ctx = Context::<All>::seeded(&[0x5e; 32]);
    group.bench_function("sign_prehash blinded", |b| {
        b.iter(|| ctx.sign_ecdsa(&black_box(z), black_box(&d)).unwrap())
    });

    let q = d.public_key();
    let s = ecdsa::sign_prehash(&d, &z).unwrap();

    group.bench_function("verify_prehash", |b| {
        b.iter(|| ecdsa::verify_prehash(black_box(&q), &black_box(z), black_box(&s)).unwrap())
    });

    #[cfg(feature = "recovery")]
    {
        let recoverable = ecdsa::sign_prehash_recoverable(&d, &z).unwrap();
        group.bench_function("recover", |b| {
            b.iter(|| black_box(&recoverable).recover(&black_box(z)).unwrap())
        });
    }

    group.finish();
}

#[cfg(feature = "schnorr")]
fn bench_schnorr(c: &mut Criterion) {
    use coinlib_secp256k1::{Keypair, schnorr};

    let mut group = c.benchmark_group("schnorr");

    let keypair = Keypair::from_secret_key(&test_secret_key());
    let (public_key, _) = keypair.x_only_public_key();
    let aux_rand = [0u8; 32];

    group.bench_function("sign", |b| {
        b.iter(|| {
            schnorr::sign(black_box(&keypair), &black_box(TEST_DIGEST), Some(&aux_rand)).unwrap()
        })
    });

    let sig = schnorr::sign(&keypair, &TEST_DIGEST, Some(&aux_rand)).unwrap();
    group.bench_function("verify", |b| {
        b.iter(|| {
            schnorr::verify(black_box(&public_key), &black_box(TEST_DIGEST), black_box(&sig))
                .unwrap()
        })
    });

    group.finish();
}

#[cfg(not(feature = "schnorr"))]
fn bench_schnorr(_c: &mut Criterion) {}

criterion_group!(benches, bench_ecdsa, bench_schnorr);
criterion_main!(benches);
