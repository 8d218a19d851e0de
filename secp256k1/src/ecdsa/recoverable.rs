//! Recoverable signatures.
//!
//! A [`RecoverableSignature`] carries a [`RecoveryId`] next to `(r, s)` so
//! that the signer's public key can be reconstructed from the signature and
//! the message hash alone.
//!
//! ## Signing/Recovery Example
//!
//! ```
//! use coinlib_secp256k1::{SecretKey, ecdsa};
//!
//! let secret_key = SecretKey::from_bytes(&[0x07; 32])?;
//! let digest = [0x5c; 32];
//!
//! let signature = ecdsa::sign_prehash_recoverable(&secret_key, &digest)?;
//! let recovered = signature.recover(&digest)?;
//! assert_eq!(recovered, secret_key.public_key());
//! # Ok::<(), coinlib_secp256k1::Error>(())
//! ```

use super::{
    RecoveryId, Signature, parse_compact, serialize_compact, sign_prehash_blinded,
    signature_scalars,
};
use crate::{
    AffinePoint, Error, FieldElement, ProjectivePoint, PublicKey, Result, Scalar, SecretKey,
    arithmetic::scalar::MODULUS, context::Blinding,
};
use elliptic_curve::subtle::Choice;

/// The curve order `n` as a field element. `n < p`, so this is canonical.
const ORDER_AS_FIELD: FieldElement = FieldElement::from_limbs_unchecked(MODULUS);

/// Signs a 32-byte message hash, returning a signature with its recovery id.
pub fn sign_prehash_recoverable(
    secret_key: &SecretKey,
    msg: &[u8; 32],
) -> Result<RecoverableSignature> {
    sign_prehash_blinded(&Blinding::NONE, secret_key, msg, None)
        .map(|(signature, recovery_id)| RecoverableSignature::new(signature, recovery_id))
}

/// ECDSA signature plus the [`RecoveryId`] needed to recover its public key.
///
/// Serialized as 65 bytes:
///
/// - `r`: 32-byte integer, big endian
/// - `s`: 32-byte integer, big endian
/// - `v`: 1-byte recovery id in `0..=3`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Size of a serialized recoverable signature in bytes.
    pub const SIZE: usize = 65;

    /// Pairs a signature with a recovery id.
    ///
    /// This is unchecked: a mismatched id makes [`Self::recover`] return a
    /// different key or fail.
    pub fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Parses a 64-byte compact signature with a separate recovery id.
    pub fn from_compact(compact: &[u8], recovery_id: RecoveryId) -> Result<Self> {
        Ok(Self::new(parse_compact(compact)?, recovery_id))
    }

    /// Parses the 65-byte `r ‖ s ‖ v` form.
    ///
    /// Fails with [`Error::InvalidInput`] on a wrong length or a recovery
    /// byte above 3.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(Error::InvalidInput);
        }
        let recovery_id = RecoveryId::from_byte(bytes[64]).ok_or(Error::InvalidInput)?;
        Self::from_compact(&bytes[..64], recovery_id)
    }

    /// Serializes as `r ‖ s ‖ v`.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..64].copy_from_slice(&serialize_compact(&self.signature));
        bytes[64] = self.recovery_id.to_byte();
        bytes
    }

    /// Returns the recovery id and the 64-byte compact signature.
    pub fn serialize_compact(&self) -> (RecoveryId, [u8; 64]) {
        (self.recovery_id, serialize_compact(&self.signature))
    }

    /// Recovery id.
    pub fn recovery_id(&self) -> RecoveryId {
        self.recovery_id
    }

    /// Drops the recovery id, returning a plain signature.
    pub fn to_standard(&self) -> Signature {
        self.signature.clone()
    }

    /// Recovers the public key that signed `msg`.
    ///
    /// Fails with [`Error::RecoveryFailed`] when the id's `R` is not on the
    /// curve, when `r + n` does not fit in the field, or when the result is
    /// the identity.
    #[allow(non_snake_case)]
    pub fn recover(&self, msg: &[u8; 32]) -> Result<PublicKey> {
        let (r, s) = signature_scalars(&self.signature).map_err(|_| Error::RecoveryFailed)?;
        let z = Scalar::from_bytes_reduced(msg);

        let r_bytes = r.to_bytes();
        let r_field = Option::<FieldElement>::from(FieldElement::from_bytes(&r_bytes))
            .ok_or(Error::RecoveryFailed)?;

        let x = if self.recovery_id.is_x_reduced() {
            // R.x = r + n, which must still be below p.
            let x = r_field + ORDER_AS_FIELD;
            if x.to_bytes() < r_bytes {
                return Err(Error::RecoveryFailed);
            }
            x
        } else {
            r_field
        };

        let y_is_odd = Choice::from(u8::from(self.recovery_id.is_y_odd()));
        let R = Option::<AffinePoint>::from(AffinePoint::decompress(&x, y_is_odd))
            .ok_or(Error::RecoveryFailed)?;

        // Q = r⁻¹·(s·R − z·G)
        let r_inv = Option::<Scalar>::from(r.invert()).ok_or(Error::RecoveryFailed)?;
        let u1 = -(z * r_inv);
        let u2 = s * r_inv;
        let Q = ProjectivePoint::lincomb_vartime(&u1, &u2, &ProjectivePoint::from(R));

        PublicKey::from_projective(&Q).map_err(|_| Error::RecoveryFailed)
    }
}

impl From<RecoverableSignature> for Signature {
    fn from(signature: RecoverableSignature) -> Signature {
        signature.signature
    }
}

impl TryFrom<&[u8]> for RecoverableSignature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_slice(bytes)
    }
}

#[cfg(feature = "signature")]
impl signature::hazmat::PrehashSigner<RecoverableSignature> for SecretKey {
    fn sign_prehash(
        &self,
        prehash: &[u8],
    ) -> core::result::Result<RecoverableSignature, signature::Error> {
        let prehash = <&[u8; 32]>::try_from(prehash).map_err(|_| Error::InvalidInput)?;
        Ok(sign_prehash_recoverable(self, prehash)?)
    }
}
