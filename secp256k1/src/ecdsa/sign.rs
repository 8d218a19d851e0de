//! ECDSA signing

use super::{MAX_NONCE_ATTEMPTS, RecoveryId, Signature, signature_from_scalars};
use crate::{Error, Result, Scalar, SecretKey, context::Blinding};
use elliptic_curve::{subtle::ConditionallySelectable, zeroize::Zeroize};
use rfc6979::HmacDrbg;
use sha2::Sha256;

/// Signs a 32-byte message hash.
///
/// The signature is deterministic in `(secret_key, msg)` and low-S.
pub fn sign_prehash(secret_key: &SecretKey, msg: &[u8; 32]) -> Result<Signature> {
    sign_prehash_blinded(&Blinding::NONE, secret_key, msg, None).map(|(signature, _)| signature)
}

/// Signs a 32-byte message hash, mixing `noncedata` into nonce derivation.
///
/// Each distinct `noncedata` yields a distinct valid signature for the same
/// key and message.
pub fn sign_prehash_with_noncedata(
    secret_key: &SecretKey,
    msg: &[u8; 32],
    noncedata: &[u8; 32],
) -> Result<Signature> {
    sign_prehash_blinded(&Blinding::NONE, secret_key, msg, Some(noncedata))
        .map(|(signature, _)| signature)
}

/// Signs with the given blinding, returning the low-S signature and the
/// recovery id matching it.
pub(crate) fn sign_prehash_blinded(
    blinding: &Blinding,
    secret_key: &SecretKey,
    msg: &[u8; 32],
    noncedata: Option<&[u8; 32]>,
) -> Result<(Signature, RecoveryId)> {
    let d = secret_key.as_scalar();
    let z = Scalar::from_bytes_reduced(msg);

    let mut nonces = nonce_drbg(secret_key, &z, noncedata);

    for _ in 0..MAX_NONCE_ATTEMPTS {
        let mut candidate = [0u8; 32];
        nonces.fill_bytes(&mut candidate);
        let k = Scalar::from_bytes(&candidate);
        candidate.zeroize();

        // Candidates >= n are skipped, not reduced.
        let Some(mut k) = Option::<Scalar>::from(k) else {
            continue;
        };

        let signed = sign_with_nonce(blinding, d, &z, &k);
        k.zeroize();

        if let Some((r, s, recovery_id)) = signed {
            return Ok((signature_from_scalars(&r, &s)?, recovery_id));
        }
    }

    Err(Error::ArithmeticDegenerate)
}

/// RFC6979 HMAC-SHA256 DRBG seeded with `secret ‖ (msg mod n) ‖ noncedata`,
/// the input layout libsecp256k1 uses. Each `fill_bytes` call yields the
/// next nonce candidate.
fn nonce_drbg(
    secret_key: &SecretKey,
    z: &Scalar,
    noncedata: Option<&[u8; 32]>,
) -> HmacDrbg<Sha256> {
    let extra: &[u8] = match noncedata {
        Some(noncedata) => noncedata,
        None => &[],
    };
    let mut key_bytes = secret_key.to_bytes();
    let drbg = HmacDrbg::new(&key_bytes, &z.to_bytes(), extra);
    key_bytes.zeroize();
    drbg
}

/// One signing attempt with nonce `k`.
///
/// Returns `None` when `k`, `r` or `s` is zero so the caller can move on to
/// the next nonce.
fn sign_with_nonce(
    blinding: &Blinding,
    d: &Scalar,
    z: &Scalar,
    k: &Scalar,
) -> Option<(Scalar, Scalar, RecoveryId)> {
    if bool::from(k.is_zero()) {
        return None;
    }

    // R = k·G; r = R.x mod n
    let big_r = blinding.mul_generator(k).to_affine();
    let (r, x_reduced) = Scalar::from_bytes_overflowing(&big_r.x().to_bytes());
    if bool::from(r.is_zero()) {
        return None;
    }

    // s = k⁻¹·(z + r·d)
    let k_inv = Option::<Scalar>::from(k.invert())?;
    let s = k_inv * (z + &(r * d));
    if bool::from(s.is_zero()) {
        return None;
    }

    // Negating s mirrors R, which flips the parity bit of the recovery id.
    let is_high = s.is_high();
    let s = Scalar::conditional_select(&s, &-s, is_high);
    let y_is_odd = big_r.y_is_odd() ^ is_high;

    Some((
        r,
        s,
        RecoveryId::new(y_is_odd.into(), x_reduced.into()),
    ))
}
