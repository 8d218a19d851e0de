//! Elliptic Curve Digital Signature Algorithm (ECDSA)
//!
//! Signatures are deterministic: the nonce is derived from the secret key
//! and the message hash with the HMAC-SHA256 DRBG of [RFC6979] (in the
//! libsecp256k1 input layout, via the `rfc6979` crate), optionally mixed
//! with 32 bytes of extra data.
//! Every signature produced here is in low-S form as defined by [BIP62].
//!
//! Messages are 32-byte hashes. Callers hash their own data, or use the
//! [`signature::Signer`] / [`signature::Verifier`] impls, which hash with
//! SHA-256.
//!
//! ## Signing and verifying
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use coinlib_secp256k1::{SecretKey, ecdsa};
//!
//! let secret_key = SecretKey::from_bytes(&[0x01; 32])?;
//! let public_key = secret_key.public_key();
//! let digest = [0x2a; 32];
//!
//! let signature = ecdsa::sign_prehash(&secret_key, &digest)?;
//! ecdsa::verify_prehash_strict(&public_key, &digest, &signature)?;
//!
//! let der = signature.to_der();
//! assert_eq!(ecdsa::parse_der(der.as_bytes())?, signature);
//! # }
//! # Ok::<(), coinlib_secp256k1::Error>(())
//! ```
//!
//! [RFC6979]: https://datatracker.ietf.org/doc/html/rfc6979
//! [BIP62]: https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki

mod sign;
mod verify;

#[cfg(feature = "recovery")]
mod recoverable;

pub use self::{
    sign::{sign_prehash, sign_prehash_with_noncedata},
    verify::{verify_prehash, verify_prehash_strict},
};
pub use ecdsa_core::RecoveryId;

#[cfg(feature = "recovery")]
pub use self::recoverable::{RecoverableSignature, sign_prehash_recoverable};

pub(crate) use self::sign::sign_prehash_blinded;

use crate::{Error, FieldBytes, Result, Scalar, Secp256k1};
use elliptic_curve::subtle::ConditionallySelectable;

/// ECDSA/secp256k1 signature (fixed-size)
pub type Signature = ecdsa_core::Signature<Secp256k1>;

/// ECDSA/secp256k1 signature (ASN.1 DER encoded)
pub type DerSignature = ecdsa_core::der::Signature<Secp256k1>;

/// Number of nonce candidates tried before signing gives up with
/// [`Error::ArithmeticDegenerate`].
///
/// Each retry needs a candidate `>= n` or a zero `r`/`s`, which happens
/// with probability below 2⁻¹²⁸ per attempt.
pub const MAX_NONCE_ATTEMPTS: usize = 64;

/// Parses a 64-byte compact `r ‖ s` signature.
///
/// Fails with [`Error::InvalidInput`] on a wrong length and
/// [`Error::InvalidScalar`] when `r` or `s` is zero or not less than the
/// curve order.
pub fn parse_compact(bytes: &[u8]) -> Result<Signature> {
    if bytes.len() != 64 {
        return Err(Error::InvalidInput);
    }
    Signature::from_slice(bytes).map_err(|_| Error::InvalidScalar)
}

/// Parses an ASN.1 DER signature.
///
/// Fails with [`Error::InvalidInput`] when the encoding is malformed and
/// [`Error::InvalidScalar`] when `r` or `s` is out of range.
pub fn parse_der(bytes: &[u8]) -> Result<Signature> {
    DerSignature::try_from(bytes).map_err(|_| Error::InvalidInput)?;
    Signature::from_der(bytes).map_err(|_| Error::InvalidScalar)
}

/// Serializes as 64-byte compact `r ‖ s`.
pub fn serialize_compact(signature: &Signature) -> [u8; 64] {
    let mut bytes = [0u8; 64];
    bytes.copy_from_slice(&signature.to_bytes());
    bytes
}

/// Normalize signature into "low S" form as described in
/// [BIP 0062: Dealing with Malleability][1].
///
/// Signatures that are already low-S are returned unchanged.
///
/// [1]: https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki
pub fn normalize_s(signature: &Signature) -> Result<Signature> {
    let (r, s) = signature_scalars(signature)?;
    let s = Scalar::conditional_select(&s, &-s, s.is_high());
    signature_from_scalars(&r, &s)
}

/// Does `signature` have `s > n/2`?
pub fn is_high_s(signature: &Signature) -> Result<bool> {
    let (_, s) = signature_scalars(signature)?;
    Ok(s.is_high().into())
}

/// Splits a signature into its `r` and `s` scalars.
pub(crate) fn signature_scalars(signature: &Signature) -> Result<(Scalar, Scalar)> {
    let (r, s) = signature.split_bytes();
    Ok((decode_scalar(&r)?, decode_scalar(&s)?))
}

fn decode_scalar(bytes: &FieldBytes) -> Result<Scalar> {
    let mut repr = [0u8; 32];
    repr.copy_from_slice(bytes);
    Option::from(Scalar::from_bytes(&repr)).ok_or(Error::InvalidScalar)
}

/// Builds a signature from non-zero scalars.
pub(crate) fn signature_from_scalars(r: &Scalar, s: &Scalar) -> Result<Signature> {
    Signature::from_scalars(r.to_bytes(), s.to_bytes()).map_err(|_| Error::InvalidScalar)
}

#[cfg(feature = "signature")]
mod signature_impls {
    use super::{Signature, sign_prehash, verify_prehash_strict};
    use crate::{Error, PublicKey, SecretKey};
    use sha2::{Digest, Sha256};
    use signature::{
        Signer, Verifier,
        hazmat::{PrehashSigner, PrehashVerifier},
    };

    pub(super) fn prehash_bytes(prehash: &[u8]) -> Result<&[u8; 32], signature::Error> {
        <&[u8; 32]>::try_from(prehash).map_err(|_| Error::InvalidInput.into())
    }

    impl PrehashSigner<Signature> for SecretKey {
        fn sign_prehash(&self, prehash: &[u8]) -> Result<Signature, signature::Error> {
            Ok(sign_prehash(self, prehash_bytes(prehash)?)?)
        }
    }

    impl Signer<Signature> for SecretKey {
        fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
            let digest: [u8; 32] = Sha256::digest(msg).into();
            Ok(sign_prehash(self, &digest)?)
        }
    }

    /// Verification through these traits rejects high-S signatures.
    impl PrehashVerifier<Signature> for PublicKey {
        fn verify_prehash(
            &self,
            prehash: &[u8],
            signature: &Signature,
        ) -> Result<(), signature::Error> {
            Ok(verify_prehash_strict(self, prehash_bytes(prehash)?, signature)?)
        }
    }

    impl Verifier<Signature> for PublicKey {
        fn verify(&self, msg: &[u8], signature: &Signature) -> Result<(), signature::Error> {
            let digest: [u8; 32] = Sha256::digest(msg).into();
            Ok(verify_prehash_strict(self, &digest, signature)?)
        }
    }
}
