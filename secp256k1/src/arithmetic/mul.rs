//! Scalar multiplication.
//!
//! Three strategies live here:
//!
//! - variable-base multiplication by a secret scalar, using signed 4-bit
//!   windows and a constant-time lookup table;
//! - fixed-base multiplication by the generator, using a comb of precomputed
//!   affine multiples `j·16ⁱ·G` built once under `precomputed-tables`, and
//!   falling back to the windowed method above without it;
//! - variable-time `a·G + b·P` for public inputs, using wNAF and Shamir's
//!   trick. Only ever call this with public scalars.

use super::{AffinePoint, ProjectivePoint, Scalar};
use core::ops::{Mul, MulAssign};
use elliptic_curve::subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

#[cfg(all(
    feature = "precomputed-tables",
    not(any(feature = "critical-section", feature = "std"))
))]
compile_error!("`precomputed-tables` feature requires either `critical-section` or `std`");

#[cfg(feature = "precomputed-tables")]
use once_cell::sync::Lazy;

/// Number of signed radix-16 digits of a scalar below 2^256.
const RADIX_16_DIGITS: usize = 65;

/// wNAF window width for variable-time multiplication.
const WNAF_WIDTH: usize = 5;

/// Number of odd multiples `[P, 3P, ..., 15P]` used with [`WNAF_WIDTH`].
const WNAF_TABLE_SIZE: usize = 1 << (WNAF_WIDTH - 2);

/// wNAF digits: 256 bits plus room for the final carry.
const WNAF_DIGITS: usize = 256 + WNAF_WIDTH;

/// Lookup table containing precomputed values `[p, 2p, 3p, ..., 8p]`
struct LookupTable([ProjectivePoint; 8]);

impl From<&ProjectivePoint> for LookupTable {
    fn from(p: &ProjectivePoint) -> Self {
        let mut points = [*p; 8];
        for j in 0..7 {
            points[j + 1] = p + &points[j];
        }
        LookupTable(points)
    }
}

impl LookupTable {
    /// Given -8 <= x <= 8, returns x * p in constant time.
    fn select(&self, x: i8) -> ProjectivePoint {
        debug_assert!((-8..=8).contains(&x));

        // Compute xabs = |x|
        let xmask = x >> 7;
        let xabs = (x + xmask) ^ xmask;

        // Get an array element in constant time
        let mut t = ProjectivePoint::IDENTITY;
        for j in 1..9 {
            let c = (xabs as u8).ct_eq(&(j as u8));
            t.conditional_assign(&self.0[j - 1], c);
        }
        // Now t == |x| * p.

        let neg_mask = Choice::from((xmask & 1) as u8);
        t.conditional_assign(&-t, neg_mask);
        // Now t == x * p.

        t
    }
}

/// Affine `[q, 2q, ..., 8q]` for one comb window of the generator.
#[cfg(any(feature = "precomputed-tables", test))]
#[derive(Clone, Copy)]
struct AffineLookupTable([AffinePoint; 8]);

#[cfg(any(feature = "precomputed-tables", test))]
impl AffineLookupTable {
    /// Given -8 <= x <= 8, returns x * q in constant time.
    fn select(&self, x: i8) -> AffinePoint {
        debug_assert!((-8..=8).contains(&x));

        let xmask = x >> 7;
        let xabs = (x + xmask) ^ xmask;

        let mut t = AffinePoint::IDENTITY;
        for (j, point) in self.0.iter().enumerate() {
            let c = (xabs as u8).ct_eq(&((j + 1) as u8));
            t.conditional_assign(point, c);
        }

        let neg_mask = Choice::from((xmask & 1) as u8);
        t.conditional_assign(&-t, neg_mask);
        t
    }
}

/// Comb table for the generator: window `i` holds `[1..=8]·16ⁱ·G`.
#[cfg(any(feature = "precomputed-tables", test))]
struct GeneratorTable([AffineLookupTable; RADIX_16_DIGITS]);

#[cfg(any(feature = "precomputed-tables", test))]
impl GeneratorTable {
    fn new() -> Self {
        let mut tables = [AffineLookupTable([AffinePoint::IDENTITY; 8]); RADIX_16_DIGITS];
        let mut base = ProjectivePoint::GENERATOR;

        for table in tables.iter_mut() {
            let mut multiples = [base; 8];
            for j in 0..7 {
                multiples[j + 1] = multiples[j] + &base;
            }
            ProjectivePoint::batch_normalize(&multiples, &mut table.0);

            // 16·base = 2·(8·base)
            base = multiples[7].double();
        }

        Self(tables)
    }

    /// `k·G` in constant time: one mixed addition per digit, no doublings.
    fn mul(&self, k: &Scalar) -> ProjectivePoint {
        let digits = to_radix_16(k);
        let mut acc = ProjectivePoint::IDENTITY;
        for (table, digit) in self.0.iter().zip(digits.iter()) {
            acc += table.select(*digit);
        }
        acc
    }
}

#[cfg(feature = "precomputed-tables")]
static GEN_TABLE: Lazy<GeneratorTable> = Lazy::new(GeneratorTable::new);

/// Returns `[a_0, ..., a_64]` such that `sum(a_j * 16^j) == k` and
/// `-8 <= a_j < 8` for `j < 64`; the top digit is 0 or 1.
fn to_radix_16(k: &Scalar) -> [i8; RADIX_16_DIGITS] {
    let mut output = [0i8; RADIX_16_DIGITS];

    // Step 1: change radix.
    for (i, digit) in output.iter_mut().take(64).enumerate() {
        *digit = k.nibble(i) as i8;
    }

    // Step 2: recenter coefficients from [0,16) to [-8,8)
    for i in 0..64 {
        let carry = (output[i] + 8) >> 4;
        output[i] -= carry << 4;
        output[i + 1] += carry;
    }

    output
}

/// Constant-time `k·x` with signed 4-bit windows.
fn mul_windowed(x: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
    let table = LookupTable::from(x);
    let digits = to_radix_16(k);

    let mut acc = table.select(digits[RADIX_16_DIGITS - 1]);
    for i in (0..RADIX_16_DIGITS - 1).rev() {
        for _j in 0..4 {
            acc = acc.double();
        }
        acc += &table.select(digits[i]);
    }
    acc
}

impl ProjectivePoint {
    /// Calculates `k * G` in constant time, where `G` is the generator.
    ///
    /// Uses the cached comb table under `precomputed-tables`, otherwise
    /// windowed multiplication of `G`.
    pub fn mul_by_generator(k: &Scalar) -> ProjectivePoint {
        #[cfg(feature = "precomputed-tables")]
        {
            GEN_TABLE.mul(k)
        }

        #[cfg(not(feature = "precomputed-tables"))]
        {
            mul_windowed(&ProjectivePoint::GENERATOR, k)
        }
    }

    /// Calculates `a·G + b·P` in variable time.
    ///
    /// The running time depends on both scalars, so this must only be used
    /// with public data such as signature verification inputs.
    pub fn lincomb_vartime(a: &Scalar, b: &Scalar, p: &ProjectivePoint) -> ProjectivePoint {
        let a_naf = wnaf(a);
        let b_naf = wnaf(b);
        let g_table = OddMultiples::generator();
        let p_table = OddMultiples::new(p);

        let top = (0..WNAF_DIGITS)
            .rev()
            .find(|&i| a_naf[i] != 0 || b_naf[i] != 0);

        let mut acc = ProjectivePoint::IDENTITY;
        let Some(top) = top else {
            return acc;
        };

        for i in (0..=top).rev() {
            acc = acc.double();
            acc = g_table.add_digit(acc, a_naf[i]);
            acc = p_table.add_digit(acc, b_naf[i]);
        }
        acc
    }
}

/// Odd multiples `[P, 3P, ..., 15P]` for wNAF digits.
#[derive(Clone, Copy)]
struct OddMultiples([ProjectivePoint; WNAF_TABLE_SIZE]);

impl OddMultiples {
    fn new(p: &ProjectivePoint) -> Self {
        let double = p.double();
        let mut points = [*p; WNAF_TABLE_SIZE];
        for j in 1..WNAF_TABLE_SIZE {
            points[j] = points[j - 1] + &double;
        }
        Self(points)
    }

    #[cfg(feature = "precomputed-tables")]
    fn generator() -> Self {
        static GEN_ODD_MULTIPLES: Lazy<OddMultiples> =
            Lazy::new(|| OddMultiples::new(&ProjectivePoint::GENERATOR));
        *GEN_ODD_MULTIPLES
    }

    #[cfg(not(feature = "precomputed-tables"))]
    fn generator() -> Self {
        Self::new(&ProjectivePoint::GENERATOR)
    }

    /// Adds `digit·P` for an odd digit in `[-15, 15]`, or nothing for zero.
    fn add_digit(&self, acc: ProjectivePoint, digit: i8) -> ProjectivePoint {
        match digit {
            0 => acc,
            d if d > 0 => acc + &self.0[(d / 2) as usize],
            d => acc - &self.0[(-d / 2) as usize],
        }
    }
}

/// Width-5 non-adjacent form: odd digits in `[-15, 15]` separated by at
/// least four zeros, with `sum(naf[i] * 2^i) == k`.
fn wnaf(k: &Scalar) -> [i8; WNAF_DIGITS] {
    let limbs = k.limbs();
    // Two zero limbs past the top so windows may read beyond bit 255.
    let x = [limbs[0], limbs[1], limbs[2], limbs[3], 0, 0];

    let width = 1u64 << WNAF_WIDTH;
    let window_mask = width - 1;

    let mut naf = [0i8; WNAF_DIGITS];
    let mut pos = 0;
    let mut carry = 0;

    while pos < WNAF_DIGITS {
        let idx = pos / 64;
        let bit = pos % 64;
        let bit_buf = if bit < 64 - WNAF_WIDTH {
            x[idx] >> bit
        } else {
            (x[idx] >> bit) | (x[idx + 1] << (64 - bit))
        };

        let window = carry + (bit_buf & window_mask);

        if window & 1 == 0 {
            pos += 1;
            continue;
        }

        if window < width / 2 {
            carry = 0;
            naf[pos] = window as i8;
        } else {
            carry = 1;
            naf[pos] = (window as i8).wrapping_sub(width as i8);
        }

        pos += WNAF_WIDTH;
    }

    naf
}

impl Mul<Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: Scalar) -> ProjectivePoint {
        mul_windowed(&self, &other)
    }
}

impl Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul_windowed(self, other)
    }
}

impl Mul<&Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul_windowed(&self, other)
    }
}

impl MulAssign<Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = mul_windowed(self, &rhs);
    }
}

impl MulAssign<&Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: &Scalar) {
        *self = mul_windowed(self, rhs);
    }
}

impl Mul<Scalar> for AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: Scalar) -> ProjectivePoint {
        mul_windowed(&ProjectivePoint::from(self), &other)
    }
}

impl Mul<&Scalar> for &AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul_windowed(&ProjectivePoint::from(self), other)
    }
}
