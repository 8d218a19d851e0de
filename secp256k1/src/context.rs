//! Capability-typed contexts and blinding state.
//!
//! A [`Context`] carries no global state. Each instance owns its blinding
//! values, so threads that want to re-seed should each hold their own
//! context; shared `&Context` references are safe for concurrent use.

use crate::{
    AffinePoint, FieldElement, Keypair, ProjectivePoint, PublicKey, Result, Scalar,
    SecretKey, hash::tagged_hash,
};
use core::{fmt, marker::PhantomData};
use elliptic_curve::{rand_core::CryptoRngCore, zeroize::Zeroize};
use sha2::Digest;

#[cfg(feature = "ecdh")]
use crate::ecdh::{self, SharedSecret};

#[cfg(feature = "ecdsa")]
use crate::ecdsa::{self, Signature};

#[cfg(feature = "recovery")]
use crate::ecdsa::RecoverableSignature;

#[cfg(feature = "schnorr")]
use crate::{XOnlyPublicKey, schnorr};

const BLINDING_SCALAR_TAG: &[u8] = b"secp256k1/blinding/scalar";
const BLINDING_COORDS_TAG: &[u8] = b"secp256k1/blinding/coords";

mod sealed {
    pub trait Sealed {}
}

/// A set of operations a [`Context`] may perform.
pub trait Capability: sealed::Sealed {
    /// Human-readable capability name.
    const DESCRIPTION: &'static str;
}

/// Capabilities that permit operations on secret keys.
pub trait Signing: Capability {}

/// Capabilities that permit signature verification and key recovery.
pub trait Verification: Capability {}

/// Signing operations only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignOnly {}

/// Verification operations only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerifyOnly {}

/// Both signing and verification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum All {}

impl sealed::Sealed for SignOnly {}
impl sealed::Sealed for VerifyOnly {}
impl sealed::Sealed for All {}

impl Capability for SignOnly {
    const DESCRIPTION: &'static str = "signing only";
}

impl Capability for VerifyOnly {
    const DESCRIPTION: &'static str = "verification only";
}

impl Capability for All {
    const DESCRIPTION: &'static str = "all capabilities";
}

impl Signing for SignOnly {}
impl Signing for All {}
impl Verification for VerifyOnly {}
impl Verification for All {}

/// Side-channel blinding for secret-dependent multiplications.
///
/// Generator multiplications compute `(k + b)·G + (−b·G)`, so the comb
/// lookups never see `k` itself. Variable-base multiplications rescale the
/// projective coordinates of the input point by `factor`.
#[derive(Clone)]
pub(crate) struct Blinding {
    /// The blinding scalar `b`.
    scalar: Scalar,

    /// `−b·G`, with randomized projective coordinates.
    offset: ProjectivePoint,

    /// Projective coordinate randomization factor.
    factor: FieldElement,
}

impl Blinding {
    /// No blinding: `b = 0`, unit factor.
    pub(crate) const NONE: Self = Self {
        scalar: Scalar::ZERO,
        offset: ProjectivePoint::IDENTITY,
        factor: FieldElement::ONE,
    };

    /// Derives blinding values from a 32-byte seed.
    pub(crate) fn from_seed(seed: &[u8; 32]) -> Self {
        let mut scalar_bytes: [u8; 32] = tagged_hash(BLINDING_SCALAR_TAG)
            .chain_update(seed)
            .finalize()
            .into();
        let mut factor_bytes: [u8; 32] = tagged_hash(BLINDING_COORDS_TAG)
            .chain_update(seed)
            .finalize()
            .into();

        let scalar = Scalar::from_bytes_reduced(&scalar_bytes);
        let factor = FieldElement::from_bytes(&factor_bytes).unwrap_or(FieldElement::ONE);
        scalar_bytes.zeroize();
        factor_bytes.zeroize();

        let offset = (-ProjectivePoint::mul_by_generator(&scalar)).randomize(&factor);
        Self {
            scalar,
            offset,
            factor,
        }
    }

    /// Is this anything other than [`Blinding::NONE`]?
    fn is_active(&self) -> bool {
        !bool::from(self.scalar.is_zero()) || self.factor != FieldElement::ONE
    }

    /// Computes `k·G` in constant time.
    pub(crate) fn mul_generator(&self, k: &Scalar) -> ProjectivePoint {
        let mut blinded = k + &self.scalar;
        let result = ProjectivePoint::mul_by_generator(&blinded) + &self.offset;
        blinded.zeroize();
        result
    }

    /// Computes `k·P` in constant time.
    pub(crate) fn mul_point(&self, point: &AffinePoint, k: &Scalar) -> ProjectivePoint {
        ProjectivePoint::from(point).randomize(&self.factor) * k
    }
}

impl Default for Blinding {
    fn default() -> Self {
        Self::NONE
    }
}

impl Drop for Blinding {
    fn drop(&mut self) {
        self.scalar.zeroize();
        self.offset.zeroize();
        self.factor.zeroize();
    }
}

/// Entry point for operations, parameterized by what the context may do.
///
/// Construct with [`Context::new`], [`Context::signing_only`] or
/// [`Context::verification_only`]. Signing methods exist only when
/// `C: Signing`; verification methods only when `C: Verification`.
pub struct Context<C: Capability> {
    blinding: Blinding,
    capability: PhantomData<C>,
}

impl Context<All> {
    /// Creates a context that can sign and verify.
    pub fn new() -> Self {
        Self::unblinded()
    }
}

impl Default for Context<All> {
    fn default() -> Self {
        Self::new()
    }
}

impl Context<SignOnly> {
    /// Creates a context that can only sign.
    pub fn signing_only() -> Self {
        Self::unblinded()
    }
}

impl Context<VerifyOnly> {
    /// Creates a context that can only verify.
    pub fn verification_only() -> Self {
        Self::unblinded()
    }
}

impl<C: Capability> Context<C> {
    fn unblinded() -> Self {
        Self {
            blinding: Blinding::NONE,
            capability: PhantomData,
        }
    }

    /// Creates a context of any capability with blinding derived from `seed`.
    pub fn seeded(seed: &[u8; 32]) -> Self {
        let mut ctx = Self::unblinded();
        ctx.randomize(seed);
        ctx
    }

    /// Re-seeds the blinding state.
    ///
    /// The seed should come from a cryptographically secure source. Results
    /// of every operation are unaffected; only the intermediate values used
    /// to compute them change.
    pub fn randomize(&mut self, seed: &[u8; 32]) {
        self.blinding = Blinding::from_seed(seed);
    }

    /// Re-seeds the blinding state from `rng`.
    pub fn randomize_with_rng(&mut self, rng: &mut impl CryptoRngCore) {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        self.randomize(&seed);
        seed.zeroize();
    }

    /// Has blinding been seeded?
    pub fn is_randomized(&self) -> bool {
        self.blinding.is_active()
    }
}

impl<C: Capability> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            blinding: self.blinding.clone(),
            capability: PhantomData,
        }
    }
}

impl<C: Capability> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("capability", &C::DESCRIPTION)
            .field("randomized", &self.is_randomized())
            .finish_non_exhaustive()
    }
}

impl<C: Signing> Context<C> {
    /// Derives the public key of `secret_key`.
    pub fn public_key(&self, secret_key: &SecretKey) -> PublicKey {
        let point = self.blinding.mul_generator(secret_key.as_scalar());
        // d is in [1, n - 1], so d·G is never the identity.
        match PublicKey::from_projective(&point) {
            Ok(public_key) => public_key,
            Err(_) => secret_key.public_key(),
        }
    }

    /// Builds a keypair from `secret_key`.
    pub fn keypair(&self, secret_key: &SecretKey) -> Keypair {
        Keypair::from_parts(secret_key.clone(), self.public_key(secret_key))
    }

    /// Generates a random secret key and its public key.
    pub fn generate_keypair(&self, rng: &mut impl CryptoRngCore) -> (SecretKey, PublicKey) {
        let secret_key = SecretKey::random(rng);
        let public_key = self.public_key(&secret_key);
        (secret_key, public_key)
    }

    /// Signs a 32-byte message hash with deterministic ECDSA, returning a
    /// low-S signature.
    #[cfg(feature = "ecdsa")]
    pub fn sign_ecdsa(&self, msg: &[u8; 32], secret_key: &SecretKey) -> Result<Signature> {
        ecdsa::sign_prehash_blinded(&self.blinding, secret_key, msg, None)
            .map(|(signature, _)| signature)
    }

    /// Signs with extra data mixed into nonce derivation.
    ///
    /// Different `noncedata` gives a different, equally valid signature.
    #[cfg(feature = "ecdsa")]
    pub fn sign_ecdsa_with_noncedata(
        &self,
        msg: &[u8; 32],
        secret_key: &SecretKey,
        noncedata: &[u8; 32],
    ) -> Result<Signature> {
        ecdsa::sign_prehash_blinded(&self.blinding, secret_key, msg, Some(noncedata))
            .map(|(signature, _)| signature)
    }

    /// Signs and returns the recovery id alongside the signature.
    #[cfg(feature = "recovery")]
    pub fn sign_ecdsa_recoverable(
        &self,
        msg: &[u8; 32],
        secret_key: &SecretKey,
    ) -> Result<RecoverableSignature> {
        ecdsa::sign_prehash_blinded(&self.blinding, secret_key, msg, None)
            .map(|(signature, recovery_id)| RecoverableSignature::new(signature, recovery_id))
    }

    /// BIP340 signature with caller-supplied auxiliary randomness.
    #[cfg(feature = "schnorr")]
    pub fn sign_schnorr(
        &self,
        msg: &[u8; 32],
        keypair: &Keypair,
        aux_rand: &[u8; 32],
    ) -> Result<schnorr::Signature> {
        schnorr::sign_blinded(&self.blinding, keypair, msg, Some(aux_rand))
    }

    /// BIP340 signature with auxiliary randomness drawn from `rng`.
    #[cfg(feature = "schnorr")]
    pub fn sign_schnorr_with_rng(
        &self,
        msg: &[u8; 32],
        keypair: &Keypair,
        rng: &mut impl CryptoRngCore,
    ) -> Result<schnorr::Signature> {
        let mut aux_rand = [0u8; 32];
        rng.fill_bytes(&mut aux_rand);
        schnorr::sign_blinded(&self.blinding, keypair, msg, Some(&aux_rand))
    }

    /// BIP340 signature without auxiliary randomness.
    #[cfg(feature = "schnorr")]
    pub fn sign_schnorr_no_aux_rand(
        &self,
        msg: &[u8; 32],
        keypair: &Keypair,
    ) -> Result<schnorr::Signature> {
        schnorr::sign_blinded(&self.blinding, keypair, msg, None)
    }

    /// Computes the SHA-256 ECDH shared secret with `public_key`.
    #[cfg(feature = "ecdh")]
    pub fn ecdh(&self, public_key: &PublicKey, secret_key: &SecretKey) -> SharedSecret {
        ecdh::shared_secret_blinded(&self.blinding, public_key, secret_key)
    }
}

impl<C: Verification> Context<C> {
    /// Verifies an ECDSA signature over a 32-byte message hash.
    ///
    /// High-S signatures are rejected; pass them through
    /// [`ecdsa::normalize_s`] first to accept them.
    #[cfg(feature = "ecdsa")]
    pub fn verify_ecdsa(
        &self,
        msg: &[u8; 32],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<()> {
        ecdsa::verify_prehash_strict(public_key, msg, signature)
    }

    /// Recovers the public key that produced `signature` over `msg`.
    #[cfg(feature = "recovery")]
    pub fn recover_ecdsa(
        &self,
        msg: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<PublicKey> {
        signature.recover(msg)
    }

    /// Verifies a BIP340 signature.
    #[cfg(feature = "schnorr")]
    pub fn verify_schnorr(
        &self,
        signature: &schnorr::Signature,
        msg: &[u8; 32],
        public_key: &XOnlyPublicKey,
    ) -> Result<()> {
        schnorr::verify(public_key, msg, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::{All, Blinding, Context, SignOnly, VerifyOnly};
    use crate::{AffinePoint, ProjectivePoint, Scalar, SecretKey};
    use proptest::prelude::*;

    #[test]
    fn unblinded_by_default() {
        assert!(!Context::new().is_randomized());
        assert!(!Context::signing_only().is_randomized());
        assert!(!Context::verification_only().is_randomized());
        assert!(Context::<All>::seeded(&[1; 32]).is_randomized());
    }

    #[test]
    fn randomize_keeps_public_keys() {
        let secret_key = SecretKey::from_bytes(&[0x5a; 32]).unwrap();
        let mut ctx = Context::<SignOnly>::signing_only();
        let before = ctx.public_key(&secret_key);
        ctx.randomize(&[0xa5; 32]);
        assert_eq!(ctx.public_key(&secret_key), before);
        assert_eq!(before, secret_key.public_key());
    }

    #[test]
    fn zero_seed_hash_still_blinds_correctly() {
        let blinding = Blinding::from_seed(&[0; 32]);
        let k = Scalar::from_u64(12345);
        assert_eq!(
            blinding.mul_generator(&k),
            ProjectivePoint::mul_by_generator(&k)
        );
    }

    #[test]
    fn debug_does_not_print_blinding() {
        use std::format;
        let ctx = Context::<VerifyOnly>::seeded(&[9; 32]);
        assert_eq!(
            format!("{ctx:?}"),
            "Context { capability: \"verification only\", randomized: true, .. }"
        );
    }

    #[test]
    fn contexts_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context<All>>();
        assert_send_sync::<Context<SignOnly>>();
        assert_send_sync::<Context<VerifyOnly>>();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn blinded_generator_mul_agrees(seed in any::<[u8; 32]>(), k in any::<[u8; 32]>()) {
            let blinding = Blinding::from_seed(&seed);
            let k = Scalar::from_bytes_reduced(&k);
            prop_assert_eq!(blinding.mul_generator(&k), ProjectivePoint::mul_by_generator(&k));
        }

        #[test]
        fn blinded_point_mul_agrees(seed in any::<[u8; 32]>(), k in any::<[u8; 32]>()) {
            let blinding = Blinding::from_seed(&seed);
            let k = Scalar::from_bytes_reduced(&k);
            let p = AffinePoint::GENERATOR;
            prop_assert_eq!(blinding.mul_point(&p, &k), ProjectivePoint::GENERATOR * k);
        }
    }
}
