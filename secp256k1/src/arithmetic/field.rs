//! Field arithmetic modulo p = 2^256 - 2^32 - 977.

use super::util::{
    adc, add_limbs, limbs_are_zero, limbs_from_be_bytes, limbs_to_be_bytes, mac, mul_wide,
    select_limbs, sub_limbs,
};
use elliptic_curve::{
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption},
    zeroize::DefaultIsZeroes,
};

#[cfg(test)]
use num_bigint::{BigUint, ToBigUint};

/// The field modulus `p`, little-endian limbs.
const MODULUS: [u64; 4] = [
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `2^256 mod p`.
const R: u64 = 0x1_0000_03D1;

/// An element in the finite field modulo p = 2^256 - 2^32 - 977.
///
/// The limbs always hold the canonical representative in `[0, p)`, so
/// equality and serialization need no normalization step.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldElement([u64; 4]);

impl FieldElement {
    /// Zero element.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Builds an element from little-endian limbs already known to be below `p`.
    pub(crate) const fn from_limbs_unchecked(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Builds an element from a small integer.
    pub const fn from_u64(w: u64) -> Self {
        Self([w, 0, 0, 0])
    }

    /// Attempts to parse the given big-endian bytes as a field element.
    ///
    /// Returns `None` if the value is not below the modulus.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let limbs = limbs_from_be_bytes(bytes);
        let (_, borrow) = sub_limbs(&limbs, &MODULUS);
        CtOption::new(Self(limbs), Choice::from((borrow >> 63) as u8))
    }

    /// Returns the big-endian encoding of this element.
    pub fn to_bytes(self) -> [u8; 32] {
        limbs_to_be_bytes(&self.0)
    }

    /// Determine if this `FieldElement` is zero.
    pub fn is_zero(&self) -> Choice {
        limbs_are_zero(&self.0)
    }

    /// Determine if this `FieldElement` is odd in the SEC1 sense: `self mod 2 == 1`.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// Returns `self + rhs mod p`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = add_limbs(&self.0, &rhs.0);
        Self::sub_modulus_if_needed(sum, carry)
    }

    /// Returns `self - rhs mod p`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = sub_limbs(&self.0, &rhs.0);
        let (wrapped, _) = add_limbs(&diff, &MODULUS);
        Self(select_limbs(&diff, &wrapped, Choice::from((borrow >> 63) as u8)))
    }

    /// Returns `-self mod p`. Zero maps to zero.
    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Returns `2 * self`.
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// Returns `self * rhs mod p`.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::reduce_wide(&mul_wide(&self.0, &rhs.0))
    }

    /// Returns `self * self mod p`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Multiplies by a small constant (`k < 2^32`).
    pub fn mul_small(&self, k: u32) -> Self {
        let k = k as u64;
        let (w0, c) = mac(0, self.0[0], k, 0);
        let (w1, c) = mac(0, self.0[1], k, c);
        let (w2, c) = mac(0, self.0[2], k, c);
        let (w3, c) = mac(0, self.0[3], k, c);
        Self::fold([w0, w1, w2, w3], c)
    }

    /// Raises self to the power `2^k`.
    pub fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Returns the multiplicative inverse of self, if self is non-zero.
    pub fn invert(&self) -> CtOption<Self> {
        // p - 2 has blocks of ones of lengths 1, 2, 22 and 223. Build 2^n - 1
        // for each block with the chain [1], [2], 3, 6, 9, 11, [22], 44, 88,
        // 176, 220, [223] and splice the blocks together.
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        let res = x223
            .pow2k(23)
            .mul(&x22)
            .pow2k(5)
            .mul(self)
            .pow2k(3)
            .mul(&x2)
            .pow2k(2)
            .mul(self);

        CtOption::new(res, !self.is_zero())
    }

    /// Returns the square root of self mod p, or `None` if no square root exists.
    pub fn sqrt(&self) -> CtOption<Self> {
        // p = 3 mod 4, so a square root of `a` is `a^((p + 1) / 4)` whenever
        // one exists. (p + 1) / 4 has blocks of ones of lengths 2, 22 and 223.
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        let res = x223.pow2k(23).mul(&x22).pow2k(6).mul(&x2).pow2k(2);

        // Only one of `a` and `-a` is a square; check which case we hit.
        let is_root = res.square().ct_eq(self);
        CtOption::new(res, is_root)
    }

    /// Reduces a 512-bit product.
    fn reduce_wide(w: &[u64; 8]) -> Self {
        // lo + 2^256 * hi = lo + R * hi (mod p)
        let (r0, c) = mac(w[0], w[4], R, 0);
        let (r1, c) = mac(w[1], w[5], R, c);
        let (r2, c) = mac(w[2], w[6], R, c);
        let (r3, c) = mac(w[3], w[7], R, c);
        Self::fold([r0, r1, r2, r3], c)
    }

    /// Reduces `w + hi * 2^256` for `hi < 2^34`.
    fn fold(w: [u64; 4], hi: u64) -> Self {
        let (w0, c) = mac(w[0], hi, R, 0);
        let (w1, c) = adc(w[1], 0, c);
        let (w2, c) = adc(w[2], 0, c);
        let (w3, c) = adc(w[3], 0, c);

        // On a second overflow the low limbs are tiny, so adding R again
        // cannot carry out of the top limb.
        let (w0, c) = mac(w0, c, R, 0);
        let (w1, c) = adc(w1, 0, c);
        let (w2, c) = adc(w2, 0, c);
        let (w3, _) = adc(w3, 0, c);

        Self::sub_modulus_if_needed([w0, w1, w2, w3], 0)
    }

    /// Brings `carry * 2^256 + w` (known to be below `2p`) into `[0, p)`.
    fn sub_modulus_if_needed(w: [u64; 4], carry: u64) -> Self {
        let (reduced, borrow) = sub_limbs(&w, &MODULUS);
        let keep = Choice::from(((borrow >> 63) & (carry ^ 1)) as u8);
        Self(select_limbs(&reduced, &w, keep))
    }

    /// Returns `p` as a [`BigUint`], for cross-checking in tests.
    #[cfg(test)]
    pub fn modulus_as_biguint() -> BigUint {
        Self::ONE.negate().to_biguint().unwrap() + 1.to_biguint().unwrap()
    }
}

impl_ring_ops!(FieldElement);

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl ConditionallySelectable for FieldElement {
    #[inline(always)]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(select_limbs(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl DefaultIsZeroes for FieldElement {}

#[cfg(test)]
mod tests {
    use num_bigint::{BigUint, ToBigUint};
    use proptest::prelude::*;

    use super::FieldElement;
    use crate::arithmetic::util::{biguint_to_bytes, bytes_to_biguint};

    impl From<&BigUint> for FieldElement {
        fn from(x: &BigUint) -> Self {
            let bytes = biguint_to_bytes(x);
            Self::from_bytes(&bytes).unwrap()
        }
    }

    impl ToBigUint for FieldElement {
        fn to_biguint(&self) -> Option<BigUint> {
            Some(bytes_to_biguint(&self.to_bytes()))
        }
    }

    #[test]
    fn zero_is_additive_identity() {
        let zero = FieldElement::ZERO;
        let one = FieldElement::ONE;
        assert_eq!(zero + &zero, zero);
        assert_eq!(one + &zero, one);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        let one = FieldElement::ONE;
        assert_eq!(one * &one, one);
    }

    #[test]
    fn from_bytes() {
        assert_eq!(FieldElement::from_bytes(&[0; 32]).unwrap(), FieldElement::ZERO);

        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(FieldElement::from_bytes(&one).unwrap(), FieldElement::ONE);

        assert!(bool::from(FieldElement::from_bytes(&[0xff; 32]).is_none()));
        let p = biguint_to_bytes(&FieldElement::modulus_as_biguint());
        assert!(bool::from(FieldElement::from_bytes(&p).is_none()));
    }

    #[test]
    fn negate_zero_is_canonical() {
        assert_eq!(-FieldElement::ZERO, FieldElement::ZERO);
        assert!(bool::from((-FieldElement::ZERO).is_zero()));
    }

    #[test]
    fn wraps_at_modulus() {
        let minus_one = -FieldElement::ONE;
        assert_eq!(minus_one + FieldElement::ONE, FieldElement::ZERO);
        assert_eq!(minus_one * minus_one, FieldElement::ONE);
        assert_eq!(minus_one.mul_small(7), -FieldElement::from_u64(7));
    }

    #[test]
    fn invert() {
        assert!(bool::from(FieldElement::ZERO.invert().is_none()));

        let one = FieldElement::ONE;
        assert_eq!(one.invert().unwrap(), one);

        let two = one + &one;
        let inv_two = two.invert().unwrap();
        assert_eq!(two * &inv_two, one);
    }

    #[test]
    fn sqrt() {
        let one = FieldElement::ONE;
        let two = one + &one;
        let four = two.square();
        let root = four.sqrt().unwrap();
        assert!(root == two || root == -two);

        // 7 = b is not a square mod p, so x = 0 has no curve point.
        assert!(bool::from(FieldElement::from_u64(7).sqrt().is_none()));
    }

    prop_compose! {
        fn field_element()(bytes in any::<[u8; 32]>()) -> FieldElement {
            let mut res = bytes_to_biguint(&bytes);
            let m = FieldElement::modulus_as_biguint();
            // p is within 2^33 of 2^256, so one subtraction is enough
            if res >= m {
                res -= m;
            }
            FieldElement::from(&res)
        }
    }

    proptest! {
        #[test]
        fn fuzzy_add(
            a in field_element(),
            b in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi + &b_bi) % FieldElement::modulus_as_biguint();
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(&a + &b, res_ref);
        }

        #[test]
        fn fuzzy_sub(
            a in field_element(),
            b in field_element()
        ) {
            let m = FieldElement::modulus_as_biguint();
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&m + &a_bi - &b_bi) % &m;
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(&a - &b, res_ref);
        }

        #[test]
        fn fuzzy_mul(
            a in field_element(),
            b in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let b_bi = b.to_biguint().unwrap();
            let res_bi = (&a_bi * &b_bi) % FieldElement::modulus_as_biguint();
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(&a * &b, res_ref);
        }

        #[test]
        fn fuzzy_mul_small(
            a in field_element(),
            k in any::<u32>()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let res_bi = (&a_bi * BigUint::from(k)) % FieldElement::modulus_as_biguint();
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(a.mul_small(k), res_ref);
        }

        #[test]
        fn fuzzy_square(
            a in field_element()
        ) {
            let a_bi = a.to_biguint().unwrap();
            let res_bi = (&a_bi * &a_bi) % FieldElement::modulus_as_biguint();
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(a.square(), res_ref);
        }

        #[test]
        fn fuzzy_negate(
            a in field_element()
        ) {
            let m = FieldElement::modulus_as_biguint();
            let a_bi = a.to_biguint().unwrap();
            let res_bi = (&m - &a_bi) % &m;
            let res_ref = FieldElement::from(&res_bi);
            assert_eq!(-a, res_ref);
        }

        #[test]
        fn fuzzy_sqrt(
            a in field_element()
        ) {
            let sqr = a.square();
            let res = sqr.sqrt().unwrap();
            assert!(res == a || res == -a);
        }

        #[test]
        fn fuzzy_invert(
            a in field_element()
        ) {
            let a = if bool::from(a.is_zero()) { FieldElement::ONE } else { a };
            let a_bi = a.to_biguint().unwrap();
            let inv = a.invert().unwrap();
            let inv_bi = inv.to_biguint().unwrap();
            let m = FieldElement::modulus_as_biguint();
            assert_eq!((&inv_bi * &a_bi) % &m, 1.to_biguint().unwrap());
        }
    }
}
