//! Scalar field arithmetic modulo the curve order n.

use super::util::{
    adc, add_limbs, limbs_are_zero, limbs_from_be_bytes, limbs_to_be_bytes, mac, mul_wide,
    select_limbs, sub_limbs,
};
use elliptic_curve::{
    rand_core::CryptoRngCore,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption},
    zeroize::DefaultIsZeroes,
};

#[cfg(test)]
use num_bigint::{BigUint, ToBigUint};

/// Constant representing the modulus
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
pub(crate) const MODULUS: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `2^256 - n`. Only the low three limbs are non-zero.
const NEG_MODULUS: [u64; 3] = [0x402D_A173_2FC9_BEBF, 0x4551_2319_50B7_5FC4, 1];

/// `floor(n / 2)`
const FRAC_MODULUS_2: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// `n - 2`, the exponent used for inversion, big-endian.
const MODULUS_MINUS_TWO: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x3F,
];

/// Scalars are elements in the finite field modulo n.
///
/// Like [`FieldElement`](super::FieldElement), the limbs always hold the
/// canonical representative in `[0, n)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar([u64; 4]);

impl Scalar {
    /// Zero scalar.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Builds a scalar from a small integer.
    pub const fn from_u64(w: u64) -> Self {
        Self([w, 0, 0, 0])
    }

    /// Attempts to parse the given big-endian bytes as a scalar.
    ///
    /// Returns `None` if the value is not below the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let limbs = limbs_from_be_bytes(bytes);
        let (_, borrow) = sub_limbs(&limbs, &MODULUS);
        CtOption::new(Self(limbs), Choice::from((borrow >> 63) as u8))
    }

    /// Parses big-endian bytes, reducing the value modulo n.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        Self::sub_modulus_if_needed(limbs_from_be_bytes(bytes), 0)
    }

    /// Parses big-endian bytes, reporting whether the value had to be reduced.
    pub(crate) fn from_bytes_overflowing(bytes: &[u8; 32]) -> (Self, Choice) {
        let limbs = limbs_from_be_bytes(bytes);
        let (_, borrow) = sub_limbs(&limbs, &MODULUS);
        let overflow = !Choice::from((borrow >> 63) as u8);
        (Self::sub_modulus_if_needed(limbs, 0), overflow)
    }

    /// Returns the big-endian encoding of this scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        limbs_to_be_bytes(&self.0)
    }

    /// Little-endian limbs.
    pub(crate) const fn limbs(&self) -> &[u64; 4] {
        &self.0
    }

    /// Returns a uniformly random non-zero scalar.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        let mut bytes = [0u8; 32];
        // Rejection sampling: n is within 2^129 of 2^256, so a retry is
        // needed with probability around 2^-127.
        loop {
            rng.fill_bytes(&mut bytes);
            let candidate = Self::from_bytes(&bytes);
            if let Some(scalar) = Option::<Self>::from(candidate) {
                if !bool::from(scalar.is_zero()) {
                    return scalar;
                }
            }
        }
    }

    /// Is this scalar equal to zero?
    pub fn is_zero(&self) -> Choice {
        limbs_are_zero(&self.0)
    }

    /// Is this scalar greater than n / 2?
    pub fn is_high(&self) -> Choice {
        let (_, borrow) = sub_limbs(&FRAC_MODULUS_2, &self.0);
        Choice::from((borrow >> 63) as u8)
    }

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = add_limbs(&self.0, &rhs.0);
        Self::sub_modulus_if_needed(sum, carry)
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = sub_limbs(&self.0, &rhs.0);
        let (wrapped, _) = add_limbs(&diff, &MODULUS);
        Self(select_limbs(&diff, &wrapped, Choice::from((borrow >> 63) as u8)))
    }

    /// Returns `-self mod n`. Zero maps to zero.
    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Returns `self * rhs mod n`.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::reduce_wide(&mul_wide(&self.0, &rhs.0))
    }

    /// Returns `self * self mod n`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Returns the multiplicative inverse of self, if self is non-zero.
    pub fn invert(&self) -> CtOption<Self> {
        // Fermat's little theorem with a fixed 4-bit window. The exponent is
        // public, so indexing the table by its digits leaks nothing.
        let mut table = [Self::ONE; 16];
        for i in 1..16 {
            table[i] = table[i - 1].mul(self);
        }

        let mut acc = Self::ONE;
        for byte in MODULUS_MINUS_TWO {
            for digit in [byte >> 4, byte & 0x0f] {
                acc = acc.square().square().square().square();
                acc = acc.mul(&table[digit as usize]);
            }
        }

        CtOption::new(acc, !self.is_zero())
    }

    /// Returns the `i`-th 4-bit digit, counting from the least significant end.
    pub(crate) fn nibble(&self, i: usize) -> u8 {
        ((self.0[i / 16] >> ((i % 16) * 4)) & 0x0f) as u8
    }

    /// Reduces a 512-bit product using `2^256 = 2^256 - n (mod n)`.
    fn reduce_wide(w: &[u64; 8]) -> Self {
        // 512 -> 386 bits
        let m: [u64; 7] = fold(&[w[0], w[1], w[2], w[3]], &[w[4], w[5], w[6], w[7]]);
        // 386 -> 260 bits
        let p: [u64; 5] = fold(&[m[0], m[1], m[2], m[3]], &[m[4], m[5], m[6]]);
        // 260 -> 257 bits
        let r: [u64; 5] = fold(&[p[0], p[1], p[2], p[3]], &[p[4]]);
        Self::sub_modulus_if_needed([r[0], r[1], r[2], r[3]], r[4])
    }

    /// Brings `carry * 2^256 + w` (known to be below `2n`) into `[0, n)`.
    fn sub_modulus_if_needed(w: [u64; 4], carry: u64) -> Self {
        let (reduced, borrow) = sub_limbs(&w, &MODULUS);
        let keep = Choice::from(((borrow >> 63) & (carry ^ 1)) as u8);
        Self(select_limbs(&reduced, &w, keep))
    }

    /// Returns `n` as a [`BigUint`], for cross-checking in tests.
    #[cfg(test)]
    pub fn modulus_as_biguint() -> BigUint {
        Self::ONE.negate().to_biguint().unwrap() + 1.to_biguint().unwrap()
    }
}

/// Computes `lo + hi * (2^256 - n)` into `OUT` limbs.
fn fold<const H: usize, const OUT: usize>(lo: &[u64; 4], hi: &[u64; H]) -> [u64; OUT] {
    let mut out = [0u64; OUT];
    out[..4].copy_from_slice(lo);
    for (i, h) in hi.iter().enumerate() {
        let mut carry = 0;
        for (j, c) in NEG_MODULUS.iter().enumerate() {
            let (v, next) = mac(out[i + j], *h, *c, carry);
            out[i + j] = v;
            carry = next;
        }
        for limb in out.iter_mut().skip(i + NEG_MODULUS.len()) {
            let (v, next) = adc(*limb, 0, carry);
            *limb = v;
            carry = next;
        }
        debug_assert_eq!(carry, 0);
    }
    out
}

impl_ring_ops!(Scalar);

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self::from_u64(k)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl ConditionallySelectable for Scalar {
    #[inline(always)]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(select_limbs(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl DefaultIsZeroes for Scalar {}

#[cfg(test)]
mod tests {
    use super::{FRAC_MODULUS_2, MODULUS, Scalar};
    use crate::arithmetic::util::{biguint_to_bytes, bytes_to_biguint};
    use num_bigint::{BigUint, ToBigUint};
    use proptest::prelude::*;

    impl From<&BigUint> for Scalar {
        fn from(x: &BigUint) -> Self {
            let bytes = biguint_to_bytes(x);
            Self::from_bytes(&bytes).unwrap()
        }
    }

    impl ToBigUint for Scalar {
        fn to_biguint(&self) -> Option<BigUint> {
            Some(bytes_to_biguint(&self.to_bytes()))
        }
    }

    /// n - 1
    const MODULUS_MINUS_ONE: [u64; 4] = [MODULUS[0] - 1, MODULUS[1], MODULUS[2], MODULUS[3]];

    #[test]
    fn is_high() {
        // 0 is not high
        let high: bool = Scalar::ZERO.is_high().into();
        assert!(!high);

        // FRAC_MODULUS_2 is not high
        let high: bool = Scalar(FRAC_MODULUS_2).is_high().into();
        assert!(!high);

        // FRAC_MODULUS_2 + 1 is high
        let mut scalar = Scalar(FRAC_MODULUS_2);
        scalar.0[0] += 1;
        let high: bool = scalar.is_high().into();
        assert!(high);

        // MODULUS - 1 is high
        let high: bool = Scalar(MODULUS_MINUS_ONE).is_high().into();
        assert!(high);
    }

    #[test]
    fn negate() {
        let zero_neg = -Scalar::ZERO;
        assert_eq!(zero_neg.0, [0u64; 4]);

        let one_neg = -Scalar::ONE;
        assert_eq!(one_neg.0, MODULUS_MINUS_ONE);

        let frac_modulus_2_neg = -Scalar(FRAC_MODULUS_2);
        let mut frac_modulus_2_plus_one = FRAC_MODULUS_2;
        frac_modulus_2_plus_one[0] += 1;
        assert_eq!(frac_modulus_2_neg.0, frac_modulus_2_plus_one);

        let modulus_minus_one_neg = -Scalar(MODULUS_MINUS_ONE);
        assert_eq!(modulus_minus_one_neg.0, Scalar::ONE.0);
    }

    #[test]
    fn from_bytes_range() {
        let n = biguint_to_bytes(&Scalar::modulus_as_biguint());
        assert!(bool::from(Scalar::from_bytes(&n).is_none()));
        assert_eq!(Scalar::from_bytes_reduced(&n), Scalar::ZERO);

        let (reduced, overflow) = Scalar::from_bytes_overflowing(&[0xff; 32]);
        assert!(bool::from(overflow));
        let expected = (BigUint::from_bytes_be(&[0xff; 32])) % Scalar::modulus_as_biguint();
        assert_eq!(reduced, Scalar::from(&expected));
    }

    #[test]
    fn invert() {
        assert!(bool::from(Scalar::ZERO.invert().is_none()));
        assert_eq!(Scalar::ONE.invert().unwrap(), Scalar::ONE);

        let minus_one = -Scalar::ONE;
        assert_eq!(minus_one.invert().unwrap(), minus_one);
    }

    #[test]
    fn nibbles() {
        let s = Scalar::from_u64(0xfedc_ba98_7654_3210);
        for i in 0..16 {
            assert_eq!(s.nibble(i) as usize, i);
        }
        assert_eq!(s.nibble(16), 0);
        assert_eq!((-Scalar::ONE).nibble(63), 0xf);
    }

    prop_compose! {
        fn scalar()(bytes in any::<[u8; 32]>()) -> Scalar {
            Scalar::from_bytes_reduced(&bytes)
        }
    }

    proptest! {
        #[test]
        fn fuzzy_add(a in scalar(), b in scalar()) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi + &b_bi) % Scalar::modulus_as_biguint();
            assert_eq!(&a + &b, Scalar::from(&res_bi));
        }

        #[test]
        fn fuzzy_sub(a in scalar(), b in scalar()) {
            let m = Scalar::modulus_as_biguint();
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&m + &a_bi - &b_bi) % &m;
            assert_eq!(&a - &b, Scalar::from(&res_bi));
        }

        #[test]
        fn fuzzy_mul(a in scalar(), b in scalar()) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi * &b_bi) % Scalar::modulus_as_biguint();
            assert_eq!(&a * &b, Scalar::from(&res_bi));
        }

        #[test]
        fn fuzzy_from_bytes_reduced(bytes in any::<[u8; 32]>()) {
            let x = BigUint::from_bytes_be(&bytes);
            let res_bi = &x % Scalar::modulus_as_biguint();
            assert_eq!(Scalar::from_bytes_reduced(&bytes), Scalar::from(&res_bi));
        }

        #[test]
        fn fuzzy_invert(a in scalar()) {
            let a = if bool::from(a.is_zero()) { Scalar::ONE } else { a };
            let a_bi = a.to_biguint().unwrap();
            let inv_bi = a.invert().unwrap().to_biguint().unwrap();
            let m = Scalar::modulus_as_biguint();
            assert_eq!((&inv_bi * &a_bi) % &m, 1.to_biguint().unwrap());
        }
    }
}
