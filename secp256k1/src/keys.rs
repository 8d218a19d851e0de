//! Secret keys, public keys, x-only keys and keypairs.
//!
//! Tweaking follows the conventions of BIP32 (additive tweaks on full keys)
//! and BIP341 (additive tweaks on x-only keys with even-y normalization).

use crate::{
    AffinePoint, EncodedPoint, Error, FieldElement, ProjectivePoint, Result, Scalar,
};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use elliptic_curve::{
    rand_core::CryptoRngCore,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Parses a 32-byte tweak, rejecting values `>= n`.
fn tweak_scalar(tweak: &[u8; 32]) -> Result<Scalar> {
    Option::from(Scalar::from_bytes(tweak)).ok_or(Error::InvalidScalar)
}

/// A secp256k1 secret key: a scalar in `[1, n - 1]`.
///
/// The scalar is wiped from memory when the key is dropped.
#[derive(Clone)]
pub struct SecretKey {
    inner: Scalar,
}

impl SecretKey {
    /// Size of an encoded secret key in bytes.
    pub const SIZE: usize = 32;

    /// Parses a 32-byte big-endian secret key.
    ///
    /// Fails with [`Error::InvalidScalar`] when the value is zero or not
    /// less than the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let scalar = Option::<Scalar>::from(Scalar::from_bytes(bytes)).ok_or(Error::InvalidScalar)?;
        Self::from_scalar(scalar)
    }

    /// Parses a secret key from a slice, which must be exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes = <&[u8; 32]>::try_from(slice).map_err(|_| Error::InvalidInput)?;
        Self::from_bytes(bytes)
    }

    /// Generates a uniformly random secret key.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self {
            inner: Scalar::random(rng),
        }
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Self> {
        if bool::from(scalar.is_zero()) {
            return Err(Error::InvalidScalar);
        }
        Ok(Self { inner: scalar })
    }

    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.inner
    }

    /// Serializes as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Returns `n - d`.
    pub fn negate(&self) -> Self {
        Self {
            inner: -self.inner,
        }
    }

    /// Returns `d + tweak`.
    ///
    /// Fails with [`Error::InvalidScalar`] if the tweak is not less than the
    /// curve order or the result is zero.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let tweak = tweak_scalar(tweak)?;
        Self::from_scalar(self.inner + tweak)
    }

    /// Returns `d · tweak`. The tweak must be a valid non-zero scalar.
    pub fn mul_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let tweak = tweak_scalar(tweak)?;
        Self::from_scalar(self.inner * tweak)
    }

    /// Derives the public key `d·G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_scalar(&self.inner)
    }
}

impl ConstantTimeEq for SecretKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.inner.ct_eq(&other.inner)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl TryFrom<&[u8]> for SecretKey {
    type Error = Error;

    fn try_from(slice: &[u8]) -> Result<Self> {
        Self::from_slice(slice)
    }
}

/// A secp256k1 public key: any curve point other than the identity.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Size of a compressed SEC1 public key.
    pub const COMPRESSED_SIZE: usize = 33;

    /// Size of an uncompressed SEC1 public key.
    pub const UNCOMPRESSED_SIZE: usize = 65;

    /// Parses a SEC1 public key: 33 bytes compressed, or 65 bytes
    /// uncompressed or hybrid.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            Self::COMPRESSED_SIZE | Self::UNCOMPRESSED_SIZE => {
                Self::from_affine(AffinePoint::from_sec1_bytes(bytes)?)
            }
            _ => Err(Error::InvalidInput),
        }
    }

    /// Wraps an affine point, rejecting the identity and points that are
    /// not on the curve.
    pub fn from_affine(point: AffinePoint) -> Result<Self> {
        if bool::from(point.is_identity() | !point.is_on_curve()) {
            return Err(Error::InvalidPoint);
        }
        Ok(Self { point })
    }

    pub(crate) fn from_projective(point: &ProjectivePoint) -> Result<Self> {
        Self::from_affine(point.to_affine())
    }

    fn from_secret_scalar(scalar: &Scalar) -> Self {
        Self {
            point: ProjectivePoint::mul_by_generator(scalar).to_affine(),
        }
    }

    /// Borrows the underlying affine point.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.point
    }

    /// Converts to projective coordinates.
    pub fn to_projective(&self) -> ProjectivePoint {
        self.point.into()
    }

    /// Compressed SEC1 encoding (33 bytes).
    pub fn serialize(&self) -> [u8; 33] {
        self.point.to_compressed()
    }

    /// Uncompressed SEC1 encoding (65 bytes).
    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        self.point.to_uncompressed()
    }

    /// Converts to an [`EncodedPoint`].
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.point.to_encoded_point(compress)
    }

    /// Returns `-P`.
    pub fn negate(&self) -> Self {
        Self { point: -self.point }
    }

    /// Returns `P + tweak·G`.
    ///
    /// Fails with [`Error::InvalidScalar`] for a tweak not less than the
    /// curve order, or [`Error::InvalidPoint`] when the result is the
    /// identity.
    pub fn add_exp_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let tweak = tweak_scalar(tweak)?;
        Self::from_projective(&(ProjectivePoint::mul_by_generator(&tweak) + &self.point))
    }

    /// Returns `tweak·P`. The tweak must be a valid non-zero scalar.
    pub fn mul_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let tweak = tweak_scalar(tweak)?;
        if bool::from(tweak.is_zero()) {
            return Err(Error::InvalidScalar);
        }
        Self::from_projective(&(self.point * tweak))
    }

    /// Adds two public keys.
    pub fn combine(&self, other: &PublicKey) -> Result<Self> {
        Self::combine_keys(&[self, other])
    }

    /// Sums a list of public keys.
    ///
    /// Fails with [`Error::InvalidInput`] for an empty list and
    /// [`Error::InvalidPoint`] when the sum is the identity.
    pub fn combine_keys(keys: &[&PublicKey]) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::InvalidInput);
        }
        let sum = keys
            .iter()
            .fold(ProjectivePoint::IDENTITY, |acc, key| acc + &key.point);
        Self::from_projective(&sum)
    }

    /// Drops the y-coordinate, returning the x-only key and the parity of
    /// the y-coordinate that was dropped.
    pub fn x_only_public_key(&self) -> (XOnlyPublicKey, Parity) {
        let parity = Parity::from(self.point.y_is_odd());
        let even = AffinePoint::conditional_select(&self.point, &-self.point, self.point.y_is_odd());
        (XOnlyPublicKey { point: even }, parity)
    }
}

impl From<&SecretKey> for PublicKey {
    fn from(secret_key: &SecretKey) -> Self {
        secret_key.public_key()
    }
}

impl From<PublicKey> for AffinePoint {
    fn from(public_key: PublicKey) -> AffinePoint {
        public_key.point
    }
}

impl From<PublicKey> for EncodedPoint {
    fn from(public_key: PublicKey) -> EncodedPoint {
        public_key.to_encoded_point(true)
    }
}

impl TryFrom<&EncodedPoint> for PublicKey {
    type Error = Error;

    fn try_from(encoded_point: &EncodedPoint) -> Result<Self> {
        Self::from_sec1_bytes(encoded_point.as_bytes())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for PublicKey {}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders keys by their compressed encoding.
impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialize().cmp(&other.serialize())
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state);
    }
}

/// Parity of a y-coordinate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Parity {
    /// Even y.
    Even = 0,
    /// Odd y.
    Odd = 1,
}

impl Parity {
    /// Returns `0` for even and `1` for odd.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parses `0` or `1`.
    pub fn from_u8(parity: u8) -> Result<Self> {
        match parity {
            0 => Ok(Parity::Even),
            1 => Ok(Parity::Odd),
            _ => Err(Error::InvalidInput),
        }
    }
}

impl From<Choice> for Parity {
    fn from(is_odd: Choice) -> Parity {
        if bool::from(is_odd) {
            Parity::Odd
        } else {
            Parity::Even
        }
    }
}

impl From<Parity> for u8 {
    fn from(parity: Parity) -> u8 {
        parity.to_u8()
    }
}

impl TryFrom<u8> for Parity {
    type Error = Error;

    fn try_from(parity: u8) -> Result<Self> {
        Self::from_u8(parity)
    }
}

/// BIP340 x-only public key: a curve point identified by its x-coordinate,
/// with the even y-coordinate implied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct XOnlyPublicKey {
    point: AffinePoint,
}

impl XOnlyPublicKey {
    /// Size of an encoded x-only key.
    pub const SIZE: usize = 32;

    /// Parses a 32-byte x-coordinate and lifts it to the point with even y.
    ///
    /// Fails with [`Error::InvalidPoint`] when `x >= p` or no curve point has
    /// this x-coordinate.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let point = FieldElement::from_bytes(bytes).and_then(|x| AffinePoint::lift_x(&x));
        Option::<AffinePoint>::from(point)
            .map(|point| Self { point })
            .ok_or(Error::InvalidPoint)
    }

    /// Parses an x-only key from a slice, which must be exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes = <&[u8; 32]>::try_from(slice).map_err(|_| Error::InvalidInput)?;
        Self::from_bytes(bytes)
    }

    /// Serializes the x-coordinate as 32 big-endian bytes.
    pub fn serialize(&self) -> [u8; 32] {
        self.point.x().to_bytes()
    }

    /// Borrows the even-y affine point.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.point
    }

    /// Returns the full public key with the given y parity.
    pub fn public_key(&self, parity: Parity) -> PublicKey {
        let odd = Choice::from(parity.to_u8());
        PublicKey {
            point: AffinePoint::conditional_select(&self.point, &-self.point, odd),
        }
    }

    /// Computes `Q = P + tweak·G` and returns the x-only form of `Q` along
    /// with the parity of its y-coordinate.
    ///
    /// Fails with [`Error::InvalidScalar`] for a tweak not less than the
    /// curve order, or [`Error::InvalidPoint`] when `Q` is the identity.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<(XOnlyPublicKey, Parity)> {
        let tweak = tweak_scalar(tweak)?;
        let tweaked =
            PublicKey::from_projective(&(ProjectivePoint::mul_by_generator(&tweak) + &self.point))?;
        Ok(tweaked.x_only_public_key())
    }

    /// Checks that `tweaked_key` with `tweaked_parity` is the result of
    /// [`XOnlyPublicKey::add_tweak`] on this key.
    pub fn tweak_add_check(
        &self,
        tweaked_key: &XOnlyPublicKey,
        tweaked_parity: Parity,
        tweak: &[u8; 32],
    ) -> bool {
        match self.add_tweak(tweak) {
            Ok((key, parity)) => key == *tweaked_key && parity == tweaked_parity,
            Err(_) => false,
        }
    }
}

impl From<PublicKey> for XOnlyPublicKey {
    fn from(public_key: PublicKey) -> XOnlyPublicKey {
        public_key.x_only_public_key().0
    }
}

impl TryFrom<&[u8]> for XOnlyPublicKey {
    type Error = Error;

    fn try_from(slice: &[u8]) -> Result<Self> {
        Self::from_slice(slice)
    }
}

impl PartialOrd for XOnlyPublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XOnlyPublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialize().cmp(&other.serialize())
    }
}

impl Hash for XOnlyPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state);
    }
}

/// A secret key together with its public key.
#[derive(Clone, Eq, PartialEq)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Builds a keypair, deriving the public key from the secret.
    pub fn from_secret_key(secret_key: &SecretKey) -> Self {
        Self::from_parts(secret_key.clone(), secret_key.public_key())
    }

    /// Parses a 32-byte secret key and derives its public key.
    pub fn from_seckey_bytes(bytes: &[u8; 32]) -> Result<Self> {
        Ok(Self::from_secret_key(&SecretKey::from_bytes(bytes)?))
    }

    /// Generates a random keypair.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::from_secret_key(&SecretKey::random(rng))
    }

    /// `public_key` must equal `secret_key·G`.
    pub(crate) fn from_parts(secret_key: SecretKey, public_key: PublicKey) -> Self {
        Self {
            secret_key,
            public_key,
        }
    }

    /// Borrows the secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Returns the public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Returns the x-only public key and the parity of the full key's y.
    pub fn x_only_public_key(&self) -> (XOnlyPublicKey, Parity) {
        self.public_key.x_only_public_key()
    }

    /// Returns the secret scalar adjusted so that its public key has even y.
    pub(crate) fn even_y_secret(&self) -> Scalar {
        let d = *self.secret_key.as_scalar();
        Scalar::conditional_select(&d, &-d, self.public_key.point.y_is_odd())
    }

    /// BIP341-style tweak: the secret is negated first if the public key has
    /// odd y, then `tweak` is added.
    ///
    /// The resulting public key's x-only form matches
    /// [`XOnlyPublicKey::add_tweak`] on this keypair's x-only key.
    pub fn add_xonly_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let tweak = tweak_scalar(tweak)?;
        let mut d = self.even_y_secret();
        let secret_key = SecretKey::from_scalar(d + tweak);
        d.zeroize();
        Ok(Self::from_secret_key(&secret_key?))
    }
}

impl From<SecretKey> for Keypair {
    fn from(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self::from_parts(secret_key, public_key)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl ZeroizeOnDrop for Keypair {}
