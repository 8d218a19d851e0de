//! BIP340 signing.

use super::{AUX_TAG, NONCE_TAG, Signature, challenge};
use crate::{Error, Keypair, Result, Scalar, context::Blinding, hash::tagged_hash};
use elliptic_curve::{subtle::ConditionallySelectable, zeroize::Zeroize};
use sha2::Digest;

/// Signs a 32-byte message with BIP340.
///
/// `aux_rand` should be fresh randomness; `None` is the same as 32 zero
/// bytes and makes the signature a function of the key and message only.
///
/// Every signature is verified before it is returned. A signature that
/// fails, e.g. after a fault during signing, is never released and
/// [`Error::VerificationFailed`] is returned instead.
pub fn sign(keypair: &Keypair, msg: &[u8; 32], aux_rand: Option<&[u8; 32]>) -> Result<Signature> {
    sign_blinded(&Blinding::NONE, keypair, msg, aux_rand)
}

/// Signs with the given blinding applied to the nonce commitment `R = k·G`.
pub(crate) fn sign_blinded(
    blinding: &Blinding,
    keypair: &Keypair,
    msg: &[u8; 32],
    aux_rand: Option<&[u8; 32]>,
) -> Result<Signature> {
    let aux_rand = aux_rand.copied().unwrap_or_default();
    let (public_key, _) = keypair.x_only_public_key();
    let public_key_bytes = public_key.serialize();

    // d is negated when the public key has odd y.
    let mut d = keypair.even_y_secret();
    let mut d_bytes = d.to_bytes();

    let mut t: [u8; 32] = tagged_hash(AUX_TAG).chain_update(aux_rand).finalize().into();
    for (a, b) in t.iter_mut().zip(d_bytes.iter()) {
        *a ^= b
    }
    d_bytes.zeroize();

    let mut rand: [u8; 32] = tagged_hash(NONCE_TAG)
        .chain_update(t)
        .chain_update(public_key_bytes)
        .chain_update(msg)
        .finalize()
        .into();
    let mut k = Scalar::from_bytes_reduced(&rand);
    t.zeroize();
    rand.zeroize();

    if bool::from(k.is_zero()) {
        d.zeroize();
        return Err(Error::ArithmeticDegenerate);
    }

    // R = k·G, with k negated so that R has even y.
    let big_r = blinding.mul_generator(&k).to_affine();
    k.conditional_assign(&-k, big_r.y_is_odd());

    let r = big_r.x();
    let e = challenge(&r.to_bytes(), &public_key_bytes, msg);
    let s = k + e * d;
    k.zeroize();
    d.zeroize();

    let signature = Signature { r, s };

    #[cfg(debug_assertions)]
    super::verify(&public_key, msg, &signature)?;

    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::{sign, sign_blinded};
    use crate::{Error, Keypair, SecretKey, context::Blinding, schnorr::verify};
    use proptest::prelude::*;

    #[test]
    fn odd_y_public_key_signs() {
        // 0x02·G has odd y, so the even-y secret is n - 2.
        let mut bytes = [0u8; 32];
        bytes[31] = 2;
        let keypair = Keypair::from_seckey_bytes(&bytes).unwrap();
        let (public_key, parity) = keypair.x_only_public_key();
        assert_eq!(parity.to_u8(), 1);

        let sig = sign(&keypair, &[0x42; 32], Some(&[0x24; 32])).unwrap();
        verify(&public_key, &[0x42; 32], &sig).unwrap();
    }

    #[test]
    fn mismatched_keypair_is_caught() {
        let secret_key = SecretKey::from_bytes(&[0x11; 32]).unwrap();
        let wrong_public = SecretKey::from_bytes(&[0x12; 32]).unwrap().public_key();
        let keypair = Keypair::from_parts(secret_key, wrong_public);

        assert_eq!(
            sign(&keypair, &[0x42; 32], Some(&[0x24; 32])),
            Err(Error::VerificationFailed)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn blinding_does_not_change_signature(
            key in 1u64..,
            msg in any::<[u8; 32]>(),
            aux in any::<[u8; 32]>(),
            seed in any::<[u8; 32]>(),
        ) {
            let mut bytes = [0u8; 32];
            bytes[24..].copy_from_slice(&key.to_be_bytes());
            let keypair = Keypair::from_seckey_bytes(&bytes).unwrap();

            let blinding = Blinding::from_seed(&seed);
            let blinded = sign_blinded(&blinding, &keypair, &msg, Some(&aux)).unwrap();
            let plain = sign(&keypair, &msg, Some(&aux)).unwrap();
            prop_assert_eq!(blinded, plain);
        }
    }
}
