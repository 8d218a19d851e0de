//! BIP340 verification.

use super::{Signature, challenge};
use crate::{Error, ProjectivePoint, Result, XOnlyPublicKey};

/// Verifies a BIP340 signature over a 32-byte message.
///
/// Computes `R' = s·G − e·P` and accepts iff `R'` is not the identity, has
/// even y, and `R'.x == r`.
pub fn verify(public_key: &XOnlyPublicKey, msg: &[u8; 32], signature: &Signature) -> Result<()> {
    let (r, s) = signature.split();
    let e = challenge(&r.to_bytes(), &public_key.serialize(), msg);

    // Public inputs only, so the variable-time path is fine here.
    let point = ProjectivePoint::from(public_key.as_affine());
    let big_r = ProjectivePoint::lincomb_vartime(s, &-e, &point).to_affine();

    if bool::from(big_r.is_identity() | big_r.y_is_odd()) || big_r.x() != *r {
        return Err(Error::VerificationFailed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::verify;
    use crate::{
        Error, Keypair,
        schnorr::{Signature, sign},
    };

    #[test]
    fn tampered_signature_fails() {
        let keypair = Keypair::from_seckey_bytes(&[0x07; 32]).unwrap();
        let (public_key, _) = keypair.x_only_public_key();
        let msg = [0x99; 32];
        let sig = sign(&keypair, &msg, None).unwrap().to_bytes();

        for i in [0, 31, 32, 63] {
            let mut tampered = sig;
            tampered[i] ^= 0x01;
            let result = Signature::from_bytes(&tampered)
                .and_then(|sig| verify(&public_key, &msg, &sig));
            assert!(result.is_err(), "byte {i} flip accepted");
        }
    }

    #[test]
    fn other_key_fails() {
        let keypair = Keypair::from_seckey_bytes(&[0x07; 32]).unwrap();
        let other = Keypair::from_seckey_bytes(&[0x08; 32]).unwrap();
        let msg = [0x99; 32];
        let sig = sign(&keypair, &msg, None).unwrap();
        assert_eq!(
            verify(&other.x_only_public_key().0, &msg, &sig),
            Err(Error::VerificationFailed)
        );
    }
}
