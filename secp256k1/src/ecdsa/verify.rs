//! ECDSA verification

use super::{Signature, signature_scalars};
use crate::{Error, ProjectivePoint, PublicKey, Result, Scalar};

/// Verifies a signature over a 32-byte message hash.
///
/// Both `s` and `n - s` are accepted. Use [`verify_prehash_strict`] to
/// reject the high-S form.
pub fn verify_prehash(public_key: &PublicKey, msg: &[u8; 32], signature: &Signature) -> Result<()> {
    let (r, s) = signature_scalars(signature).map_err(|_| Error::VerificationFailed)?;
    if bool::from(r.is_zero() | s.is_zero()) {
        return Err(Error::VerificationFailed);
    }

    let z = Scalar::from_bytes_reduced(msg);
    let s_inv = Option::<Scalar>::from(s.invert()).ok_or(Error::VerificationFailed)?;
    let u1 = z * s_inv;
    let u2 = r * s_inv;

    // Public inputs only, so the variable-time path is fine here.
    let point = ProjectivePoint::lincomb_vartime(&u1, &u2, &public_key.to_projective());
    if bool::from(point.is_identity()) {
        return Err(Error::VerificationFailed);
    }

    let x = point.to_affine().x();
    if Scalar::from_bytes_reduced(&x.to_bytes()) == r {
        Ok(())
    } else {
        Err(Error::VerificationFailed)
    }
}

/// Verifies a signature, rejecting high-S signatures with
/// [`Error::VerificationFailed`].
pub fn verify_prehash_strict(
    public_key: &PublicKey,
    msg: &[u8; 32],
    signature: &Signature,
) -> Result<()> {
    let (_, s) = signature_scalars(signature).map_err(|_| Error::VerificationFailed)?;
    if bool::from(s.is_high()) {
        return Err(Error::VerificationFailed);
    }
    verify_prehash(public_key, msg, signature)
}
