//! Elliptic Curve Diffie-Hellman (ECDH).
//!
//! The default shared secret is `SHA-256(compressed(d·P))`, the construction
//! libsecp256k1 uses. Hashing the compressed point rather than handing out
//! raw coordinates keeps the parity of the shared point out of the output.
//! [`shared_secret_point`] and [`SharedSecret::with_hash`] are available for
//! protocols that specify their own key derivation.
//!
//! # Usage
//!
//! This usage example is from the perspective of two participants in the
//! exchange, nicknamed "Alice" and "Bob".
//!
//! ```
//! use coinlib_secp256k1::{PublicKey, SecretKey, ecdh::SharedSecret};
//!
//! // Alice
//! let alice_secret = SecretKey::from_bytes(&[0x0a; 32])?;
//! let alice_pk_bytes = alice_secret.public_key().serialize();
//!
//! // Bob
//! let bob_secret = SecretKey::from_bytes(&[0x0b; 32])?;
//! let bob_pk_bytes = bob_secret.public_key().serialize();
//!
//! // Alice decodes Bob's serialized public key and computes a shared secret from it
//! let bob_public = PublicKey::from_sec1_bytes(&bob_pk_bytes)?;
//! let alice_shared = SharedSecret::new(&bob_public, &alice_secret);
//!
//! // Bob decodes Alice's serialized public key and computes the same shared secret
//! let alice_public = PublicKey::from_sec1_bytes(&alice_pk_bytes)?;
//! let bob_shared = SharedSecret::new(&alice_public, &bob_secret);
//!
//! // Both participants arrive on the same shared secret
//! assert_eq!(alice_shared, bob_shared);
//! # Ok::<(), coinlib_secp256k1::Error>(())
//! ```

use crate::{AffinePoint, PublicKey, SecretKey, context::Blinding};
use core::fmt;
use elliptic_curve::{
    subtle::{Choice, ConstantTimeEq},
    zeroize::{Zeroize, ZeroizeOnDrop},
};
use sha2::{Digest, Sha256};

/// Shared secret value computed via ECDH key agreement.
///
/// Compared in constant time and zeroized on drop.
#[derive(Clone)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Size of a shared secret in bytes.
    pub const SIZE: usize = 32;

    /// Computes `SHA-256(compressed(secret_key·public_key))`.
    pub fn new(public_key: &PublicKey, secret_key: &SecretKey) -> Self {
        shared_secret_blinded(&Blinding::NONE, public_key, secret_key)
    }

    /// Computes `secret_key·public_key` and derives the secret from its
    /// coordinates with `hash(x, y)`.
    pub fn with_hash<F>(public_key: &PublicKey, secret_key: &SecretKey, hash: F) -> Self
    where
        F: FnOnce(&[u8; 32], &[u8; 32]) -> [u8; 32],
    {
        let point = shared_point(&Blinding::NONE, public_key, secret_key);
        let mut x = point.x().to_bytes();
        let mut y = point.y().to_bytes();
        let secret = Self(hash(&x, &y));
        x.zeroize();
        y.zeroize();
        secret
    }

    /// Wraps 32 bytes computed elsewhere.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Copies out the secret bytes.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for SharedSecret {}

/// Returns the raw shared point `x ‖ y` (64 bytes) of
/// `secret_key·public_key`.
///
/// The output is not uniformly random. Hash it before using it as a key.
pub fn shared_secret_point(public_key: &PublicKey, secret_key: &SecretKey) -> [u8; 64] {
    let point = shared_point(&Blinding::NONE, public_key, secret_key);
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&point.x().to_bytes());
    out[32..].copy_from_slice(&point.y().to_bytes());
    out
}

/// Hashed shared secret with `blinding` applied to the multiplication.
pub(crate) fn shared_secret_blinded(
    blinding: &Blinding,
    public_key: &PublicKey,
    secret_key: &SecretKey,
) -> SharedSecret {
    let mut compressed = shared_point(blinding, public_key, secret_key).to_compressed();
    let secret = SharedSecret(Sha256::digest(compressed).into());
    compressed.zeroize();
    secret
}

/// `secret_key·public_key`, never the identity: the key is non-zero and the
/// group has prime order.
fn shared_point(blinding: &Blinding, public_key: &PublicKey, secret_key: &SecretKey) -> AffinePoint {
    blinding
        .mul_point(public_key.as_affine(), secret_key.as_scalar())
        .to_affine()
}
