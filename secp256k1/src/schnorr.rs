//! Taproot Schnorr signatures as defined in [BIP340].
//!
//! # About
//!
//! BIP340 Schnorr signatures work over secp256k1 with 32-byte x-only public
//! keys: of the two points sharing an x-coordinate, the one with even `y`
//! is always meant. Signatures are 64 bytes, `R.x ‖ s`, and are
//! non-malleable.
//!
//! Signing is deterministic in the secret key, the message and the 32 bytes
//! of auxiliary randomness. Fresh auxiliary randomness per signature is
//! recommended; omitting it is the same as passing 32 zero bytes.
//!
//! Messages are 32 bytes. Hash longer messages first, for instance with
//! [`tagged_sha256`](crate::tagged_sha256).
//!
//! # Usage
//!
//! ```
//! use coinlib_secp256k1::{Keypair, schnorr};
//!
//! let keypair = Keypair::from_seckey_bytes(&[0x33; 32])?;
//! let (public_key, _parity) = keypair.x_only_public_key();
//!
//! let message = [0xab; 32];
//! let aux_rand = [0x01; 32];
//! let signature = schnorr::sign(&keypair, &message, Some(&aux_rand))?;
//!
//! let bytes = signature.to_bytes();
//! let parsed = schnorr::Signature::from_bytes(&bytes)?;
//! schnorr::verify(&public_key, &message, &parsed)?;
//! # Ok::<(), coinlib_secp256k1::Error>(())
//! ```
//!
//! [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki

mod sign;
mod verify;

pub use self::{sign::sign, verify::verify};

pub(crate) use self::sign::sign_blinded;

use crate::{Error, FieldElement, Result, Scalar, hash::tagged_hash};
use core::fmt;
use sha2::Digest;

const AUX_TAG: &[u8] = b"BIP0340/aux";
const NONCE_TAG: &[u8] = b"BIP0340/nonce";
const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// Taproot Schnorr signature serialized as bytes.
pub type SignatureBytes = [u8; Signature::BYTE_SIZE];

/// Taproot Schnorr signature as defined in [BIP340].
///
/// [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature {
    r: FieldElement,
    s: Scalar,
}

impl Signature {
    /// Size of a Taproot Schnorr signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Parses `r ‖ s`.
    ///
    /// Fails with [`Error::InvalidPoint`] when `r >= p` and
    /// [`Error::InvalidScalar`] when `s >= n`. Whether `r` is the
    /// x-coordinate of a curve point is left to verification.
    pub fn from_bytes(bytes: &SignatureBytes) -> Result<Self> {
        let (r_bytes, s_bytes) = bytes.split_at(Self::BYTE_SIZE / 2);
        let r_bytes = <&[u8; 32]>::try_from(r_bytes).map_err(|_| Error::InvalidInput)?;
        let s_bytes = <&[u8; 32]>::try_from(s_bytes).map_err(|_| Error::InvalidInput)?;

        let r = Option::<FieldElement>::from(FieldElement::from_bytes(r_bytes))
            .ok_or(Error::InvalidPoint)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes(s_bytes)).ok_or(Error::InvalidScalar)?;
        Ok(Self { r, s })
    }

    /// Parses a signature from a slice, which must be exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes = <&SignatureBytes>::try_from(bytes).map_err(|_| Error::InvalidInput)?;
        Self::from_bytes(bytes)
    }

    /// Serialize this signature as bytes.
    pub fn to_bytes(&self) -> SignatureBytes {
        let mut ret = [0; Self::BYTE_SIZE];
        let (r_bytes, s_bytes) = ret.split_at_mut(Self::BYTE_SIZE / 2);
        r_bytes.copy_from_slice(&self.r.to_bytes());
        s_bytes.copy_from_slice(&self.s.to_bytes());
        ret
    }

    /// Split this signature into its `r` and `s` components.
    fn split(&self) -> (&FieldElement, &Scalar) {
        (&self.r, &self.s)
    }
}

impl From<Signature> for SignatureBytes {
    fn from(signature: Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(signature: &Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Signature> {
        Self::from_slice(bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schnorr::Signature(")?;
        for byte in self.to_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

#[cfg(feature = "signature")]
impl signature::SignatureEncoding for Signature {
    type Repr = SignatureBytes;

    fn to_bytes(&self) -> Self::Repr {
        self.into()
    }
}

/// `e = int(hash_challenge(R.x ‖ P.x ‖ m)) mod n`
fn challenge(r: &[u8; 32], public_key: &[u8; 32], msg: &[u8; 32]) -> Scalar {
    let e: [u8; 32] = tagged_hash(CHALLENGE_TAG)
        .chain_update(r)
        .chain_update(public_key)
        .chain_update(msg)
        .finalize()
        .into();
    Scalar::from_bytes_reduced(&e)
}

#[cfg(feature = "signature")]
mod signature_impls {
    use super::{Signature, sign, verify};
    use crate::{Error, Keypair, XOnlyPublicKey};
    use signature::{Signer, Verifier};

    /// Signs 32-byte messages without auxiliary randomness.
    impl Signer<Signature> for Keypair {
        fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
            let msg = <&[u8; 32]>::try_from(msg).map_err(|_| Error::InvalidInput)?;
            Ok(sign(self, msg, None)?)
        }
    }

    impl Verifier<Signature> for XOnlyPublicKey {
        fn verify(&self, msg: &[u8], signature: &Signature) -> Result<(), signature::Error> {
            let msg = <&[u8; 32]>::try_from(msg).map_err(|_| Error::InvalidInput)?;
            Ok(verify(self, msg, signature)?)
        }
    }
}
