//! Limb helpers shared by the field and scalar implementations.

use elliptic_curve::subtle::{Choice, ConditionallySelectable};

#[cfg(test)]
use num_bigint::{BigUint, ToBigUint};
#[cfg(test)]
use num_traits::cast::ToPrimitive;

/// Computes `a + b + carry`, returning the result along with the new carry.
#[inline(always)]
pub(crate) const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a - (b + borrow)`, returning the result along with the new borrow.
///
/// The borrow is either `0` or `u64::MAX`.
#[inline(always)]
pub(crate) const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a + (b * c) + carry`, returning the result along with the new carry.
#[inline(always)]
pub(crate) const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + ((b as u128) * (c as u128)) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Parses big-endian bytes into little-endian limbs.
pub(crate) const fn limbs_from_be_bytes(bytes: &[u8; 32]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    let mut i = 0;
    while i < 4 {
        let mut limb = 0u64;
        let mut j = 0;
        while j < 8 {
            limb = (limb << 8) | bytes[(3 - i) * 8 + j] as u64;
            j += 1;
        }
        limbs[i] = limb;
        i += 1;
    }
    limbs
}

/// Serializes little-endian limbs as big-endian bytes.
pub(crate) fn limbs_to_be_bytes(limbs: &[u64; 4]) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (chunk, limb) in bytes.chunks_exact_mut(8).zip(limbs.iter().rev()) {
        chunk.copy_from_slice(&limb.to_be_bytes());
    }
    bytes
}

/// Adds two 256-bit values, returning the low 256 bits and the carry bit.
#[inline(always)]
pub(crate) const fn add_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], u64) {
    let (w0, carry) = adc(a[0], b[0], 0);
    let (w1, carry) = adc(a[1], b[1], carry);
    let (w2, carry) = adc(a[2], b[2], carry);
    let (w3, carry) = adc(a[3], b[3], carry);
    ([w0, w1, w2, w3], carry)
}

/// Subtracts two 256-bit values, returning the wrapped difference and the
/// borrow (`0` or `u64::MAX`).
#[inline(always)]
pub(crate) const fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], u64) {
    let (w0, borrow) = sbb(a[0], b[0], 0);
    let (w1, borrow) = sbb(a[1], b[1], borrow);
    let (w2, borrow) = sbb(a[2], b[2], borrow);
    let (w3, borrow) = sbb(a[3], b[3], borrow);
    ([w0, w1, w2, w3], borrow)
}

/// Full 256x256 -> 512-bit schoolbook multiplication.
#[inline(always)]
pub(crate) fn mul_wide(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut w = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0;
        for j in 0..4 {
            let (lo, hi) = mac(w[i + j], a[i], b[j], carry);
            w[i + j] = lo;
            carry = hi;
        }
        w[i + 4] = carry;
    }
    w
}

/// Constant-time selection over limb arrays: `b` when `choice` is set.
#[inline(always)]
pub(crate) fn select_limbs(a: &[u64; 4], b: &[u64; 4], choice: Choice) -> [u64; 4] {
    [
        u64::conditional_select(&a[0], &b[0], choice),
        u64::conditional_select(&a[1], &b[1], choice),
        u64::conditional_select(&a[2], &b[2], choice),
        u64::conditional_select(&a[3], &b[3], choice),
    ]
}

/// Returns `1` when all limbs are zero.
#[inline(always)]
pub(crate) fn limbs_are_zero(limbs: &[u64; 4]) -> Choice {
    let acc = limbs[0] | limbs[1] | limbs[2] | limbs[3];
    // `acc | -acc` has its top bit set iff `acc != 0`
    Choice::from((((acc | acc.wrapping_neg()) >> 63) ^ 1) as u8)
}

/// Converts a byte array (big-endian) to BigUint.
#[cfg(test)]
pub fn bytes_to_biguint(bytes: &[u8; 32]) -> BigUint {
    bytes
        .iter()
        .enumerate()
        .map(|(i, w)| w.to_biguint().unwrap() << ((31 - i) * 8))
        .sum()
}

/// Converts a BigUint to a byte array (big-endian).
#[cfg(test)]
pub fn biguint_to_bytes(x: &BigUint) -> [u8; 32] {
    let mask = BigUint::from(u8::MAX);
    let mut bytes = [0u8; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = ((x >> ((31 - i) * 8)) as BigUint & &mask).to_u8().unwrap();
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::{add_limbs, limbs_from_be_bytes, limbs_to_be_bytes, mul_wide, sub_limbs};
    use hex_literal::hex;

    #[test]
    fn byte_order() {
        let bytes = hex!("0102030405060708 1112131415161718 2122232425262728 3132333435363738");
        let limbs = limbs_from_be_bytes(&bytes);
        assert_eq!(limbs[0], 0x3132333435363738);
        assert_eq!(limbs[3], 0x0102030405060708);
        assert_eq!(limbs_to_be_bytes(&limbs), bytes);
    }

    #[test]
    fn carry_and_borrow() {
        let max = [u64::MAX; 4];
        let one = [1, 0, 0, 0];
        assert_eq!(add_limbs(&max, &one), ([0; 4], 1));
        assert_eq!(sub_limbs(&[0; 4], &one), (max, u64::MAX));
    }

    #[test]
    fn wide_square_of_max() {
        // (2^256 - 1)^2 = 2^512 - 2^257 + 1
        let w = mul_wide(&[u64::MAX; 4], &[u64::MAX; 4]);
        assert_eq!(w, [1, 0, 0, 0, u64::MAX - 1, u64::MAX, u64::MAX, u64::MAX]);
    }
}
