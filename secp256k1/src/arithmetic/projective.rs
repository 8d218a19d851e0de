//! Projective points

#![allow(clippy::op_ref)]

use super::{AffinePoint, CURVE_EQUATION_B_SINGLE, FieldElement};
use crate::EncodedPoint;
use core::{
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};
use elliptic_curve::{
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
    zeroize::DefaultIsZeroes,
};

/// A point on the secp256k1 curve in homogeneous projective coordinates:
/// `(X : Y : Z)` stands for the affine point `(X / Z, Y / Z)`.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
    };

    /// Returns the affine representation of this point.
    pub fn to_affine(&self) -> AffinePoint {
        let zinv = self.z.invert().unwrap_or(FieldElement::ZERO);
        AffinePoint::conditional_select(
            &self.to_affine_internal(&zinv),
            &AffinePoint::IDENTITY,
            self.is_identity(),
        )
    }

    fn to_affine_internal(self, zinv: &FieldElement) -> AffinePoint {
        AffinePoint::new(self.x * zinv, self.y * zinv)
    }

    /// Converts many points to affine form with a single field inversion.
    ///
    /// `out` must be the same length as `points`.
    pub fn batch_normalize(points: &[Self], out: &mut [AffinePoint]) {
        debug_assert_eq!(points.len(), out.len());

        // The identity has Z = 0, which would poison the shared inversion;
        // substitute one and patch the output afterwards.
        let z_or_one = |p: &Self| {
            FieldElement::conditional_select(&p.z, &FieldElement::ONE, p.is_identity())
        };

        // Forward pass: out[i].x holds the product of the first i z-coordinates.
        let mut acc = FieldElement::ONE;
        for (point, slot) in points.iter().zip(out.iter_mut()) {
            slot.x = acc;
            acc *= z_or_one(point);
        }

        // All factors are non-zero, so the inversion succeeds.
        let mut inv = acc.invert().unwrap_or(FieldElement::ZERO);

        for (point, slot) in points.iter().zip(out.iter_mut()).rev() {
            let zinv = inv * slot.x;
            inv *= z_or_one(point);
            *slot = AffinePoint::conditional_select(
                &point.to_affine_internal(&zinv),
                &AffinePoint::IDENTITY,
                point.is_identity(),
            );
        }
    }

    /// Is this point the identity point?
    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    /// Returns `-self`.
    fn neg(&self) -> ProjectivePoint {
        ProjectivePoint {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    /// Returns `self + other`.
    fn add(&self, other: &ProjectivePoint) -> ProjectivePoint {
        // Complete addition formula from Renes-Costello-Batina 2015
        // (https://eprint.iacr.org/2015/1060 Algorithm 7).
        let xx = self.x * &other.x;
        let yy = self.y * &other.y;
        let zz = self.z * &other.z;

        let xy_pairs = ((self.x + &self.y) * &(other.x + &other.y)) - &(xx + &yy);
        let yz_pairs = ((self.y + &self.z) * &(other.y + &other.z)) - &(yy + &zz);
        let xz_pairs = ((self.x + &self.z) * &(other.x + &other.z)) - &(xx + &zz);

        let bzz = zz.mul_small(CURVE_EQUATION_B_SINGLE);
        let bzz3 = bzz.double() + &bzz;

        let yy_m_bzz3 = yy - &bzz3;
        let yy_p_bzz3 = yy + &bzz3;

        let byz = yz_pairs.mul_small(CURVE_EQUATION_B_SINGLE);
        let byz3 = byz.double() + &byz;

        let xx3 = xx.double() + &xx;
        let bxx9 = (xx3.double() + &xx3).mul_small(CURVE_EQUATION_B_SINGLE);

        ProjectivePoint {
            x: (xy_pairs * &yy_m_bzz3) - &(byz3 * &xz_pairs),
            y: (yy_p_bzz3 * &yy_m_bzz3) + &(bxx9 * &xz_pairs),
            z: (yz_pairs * &yy_p_bzz3) + &(xx3 * &xy_pairs),
        }
    }

    /// Returns `self + other`.
    fn add_mixed(&self, other: &AffinePoint) -> ProjectivePoint {
        // Complete mixed addition from Renes-Costello-Batina 2015
        // (https://eprint.iacr.org/2015/1060 Algorithm 8). The affine operand
        // cannot express the identity, so that case is patched at the end.
        let xx = self.x * &other.x;
        let yy = self.y * &other.y;
        let xy_pairs = ((self.x + &self.y) * &(other.x + &other.y)) - &(xx + &yy);
        let yz_pairs = (other.y * &self.z) + &self.y;
        let xz_pairs = (other.x * &self.z) + &self.x;

        let bzz = self.z.mul_small(CURVE_EQUATION_B_SINGLE);
        let bzz3 = bzz.double() + &bzz;

        let yy_m_bzz3 = yy - &bzz3;
        let yy_p_bzz3 = yy + &bzz3;

        let byz = yz_pairs.mul_small(CURVE_EQUATION_B_SINGLE);
        let byz3 = byz.double() + &byz;

        let xx3 = xx.double() + &xx;
        let bxx9 = (xx3.double() + &xx3).mul_small(CURVE_EQUATION_B_SINGLE);

        let mut ret = ProjectivePoint {
            x: (xy_pairs * &yy_m_bzz3) - &(byz3 * &xz_pairs),
            y: (yy_p_bzz3 * &yy_m_bzz3) + &(bxx9 * &xz_pairs),
            z: (yz_pairs * &yy_p_bzz3) + &(xx3 * &xy_pairs),
        };
        ret.conditional_assign(self, other.is_identity());
        ret
    }

    /// Doubles this point.
    pub fn double(&self) -> ProjectivePoint {
        // Exception-free doubling from Renes-Costello-Batina 2015
        // (https://eprint.iacr.org/2015/1060 Algorithm 9).
        let yy = self.y.square();
        let zz = self.z.square();
        let xy2 = (self.x * &self.y).double();

        let bzz = zz.mul_small(CURVE_EQUATION_B_SINGLE);
        let bzz3 = bzz.double() + &bzz;
        let bzz9 = bzz3.double() + &bzz3;

        let yy_m_bzz9 = yy - &bzz9;
        let yy_p_bzz3 = yy + &bzz3;

        let yy_zz = yy * &zz;
        let yy_zz8 = yy_zz.double().double().double();
        let t = (yy_zz8.double() + &yy_zz8).mul_small(CURVE_EQUATION_B_SINGLE);

        ProjectivePoint {
            x: xy2 * &yy_m_bzz9,
            y: (yy_m_bzz9 * &yy_p_bzz3) + &t,
            z: ((yy * &self.y) * &self.z).double().double().double(),
        }
    }

    /// Returns `self - other`.
    fn sub(&self, other: &ProjectivePoint) -> ProjectivePoint {
        self.add(&other.neg())
    }

    /// Returns `self - other`.
    fn sub_mixed(&self, other: &AffinePoint) -> ProjectivePoint {
        self.add_mixed(&other.neg())
    }

    /// Rescales all coordinates by `factor`.
    ///
    /// The point itself is unchanged when `factor` is non-zero; only its
    /// representation moves. Used to blind the inputs of secret-dependent
    /// multiplications.
    pub fn randomize(&self, factor: &FieldElement) -> ProjectivePoint {
        let factor = FieldElement::conditional_select(factor, &FieldElement::ONE, factor.is_zero());
        ProjectivePoint {
            x: self.x * &factor,
            y: self.y * &factor,
            z: self.z * &factor,
        }
    }

    /// Converts to an [`EncodedPoint`].
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.to_affine().to_encoded_point(compress)
    }

    /// Compares with an affine point without inverting Z.
    pub(crate) fn eq_affine(&self, other: &AffinePoint) -> Choice {
        // For the identity to match, both must be the identity.
        let both_identity = self.is_identity() & other.is_identity();

        let rhs_x = other.x * &self.z;
        let rhs_y = other.y * &self.z;
        let same_point = self.x.ct_eq(&rhs_x)
            & self.y.ct_eq(&rhs_y)
            & !self.is_identity()
            & !other.is_identity();

        both_identity | same_point
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        let projective = ProjectivePoint {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        };
        Self::conditional_select(&projective, &Self::IDENTITY, p.is_identity())
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        ProjectivePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // (X₁ : Y₁ : Z₁) = (X₂ : Y₂ : Z₂) iff X₁Z₂ = X₂Z₁ and Y₁Z₂ = Y₂Z₁.
        // Two identities (0 : Y : 0) compare equal; an identity never matches
        // a finite point because Y·Z of the finite point is non-zero.
        let x_eq = (self.x * &other.z).ct_eq(&(other.x * &self.z));
        let y_eq = (self.y * &other.z).ct_eq(&(other.y * &self.z));
        x_eq & y_eq
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl PartialEq<AffinePoint> for ProjectivePoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        self.eq_affine(other).into()
    }
}

impl PartialEq<ProjectivePoint> for AffinePoint {
    fn eq(&self, other: &ProjectivePoint) -> bool {
        other.eq_affine(self).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DefaultIsZeroes for ProjectivePoint {}

impl Add<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, &other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl AddAssign<ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::add(self, &rhs);
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Add<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, &other)
    }
}

impl Add<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, other)
    }
}

impl Add<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(self, other)
    }
}

impl AddAssign<AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, &rhs);
    }
}

impl AddAssign<&AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, rhs);
    }
}

impl Sum for ProjectivePoint {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ProjectivePoint::IDENTITY, |a, b| a + b)
    }
}

impl<'a> Sum<&'a ProjectivePoint> for ProjectivePoint {
    fn sum<I: Iterator<Item = &'a ProjectivePoint>>(iter: I) -> Self {
        iter.cloned().sum()
    }
}

impl Sub<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, &other)
    }
}

impl Sub<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, other)
    }
}

impl Sub<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(self, other)
    }
}

impl SubAssign<ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::sub(self, &rhs);
    }
}

impl SubAssign<&ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::sub(self, rhs);
    }
}

impl Sub<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, &other)
    }
}

impl Sub<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, other)
    }
}

impl SubAssign<AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, &rhs);
    }
}

impl SubAssign<&AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, rhs);
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

impl Neg for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AffinePoint, ProjectivePoint};
    use crate::arithmetic::FieldElement;
    use hex_literal::hex;

    /// Compressed encodings of `k·G` for k = 1, 2, 3, 4.
    const ADD_TEST_VECTORS: [[u8; 33]; 4] = [
        hex!("0279BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"),
        hex!("02C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5"),
        hex!("02F9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9"),
        hex!("02E493DBF1C10D80F3581E4904930B1404CC6C13900EE0758474FA94ABE8C4CD13"),
    ];

    #[test]
    fn affine_to_projective() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(ProjectivePoint::from(basepoint_affine), basepoint_projective);
        assert_eq!(basepoint_projective.to_affine(), basepoint_affine);
        assert!(!bool::from(basepoint_projective.to_affine().is_identity()));

        assert!(bool::from(ProjectivePoint::IDENTITY.to_affine().is_identity()));
        assert!(bool::from(
            ProjectivePoint::from(AffinePoint::IDENTITY).is_identity()
        ));
    }

    #[test]
    fn projective_identity_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let generator = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &generator, generator);
        assert_eq!(generator + &identity, generator);
        assert_eq!(identity + &identity, identity);
        assert_eq!(identity + &AffinePoint::IDENTITY, identity);
        assert_eq!(generator + &AffinePoint::IDENTITY, generator);
    }

    #[test]
    fn test_vector_repeated_add() {
        let generator = ProjectivePoint::GENERATOR;
        let mut p = generator;

        for expected in ADD_TEST_VECTORS.iter() {
            assert_eq!(&p.to_affine().to_compressed(), expected);
            p += &generator;
        }
    }

    #[test]
    fn test_vector_repeated_add_mixed() {
        let generator = AffinePoint::GENERATOR;
        let mut p = ProjectivePoint::GENERATOR;

        for expected in ADD_TEST_VECTORS.iter() {
            assert_eq!(&p.to_affine().to_compressed(), expected);
            p += &generator;
        }
    }

    #[test]
    fn test_vector_double_generator() {
        let generator = ProjectivePoint::GENERATOR;
        let mut p = generator;

        for i in 0..2 {
            assert_eq!(&p.to_affine().to_compressed(), &ADD_TEST_VECTORS[(1 << i) - 1]);
            p = p.double();
        }
    }

    #[test]
    fn projective_add_vs_double() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator + &generator, generator.double());
        assert_eq!(generator + &AffinePoint::GENERATOR, generator.double());
    }

    #[test]
    fn projective_add_and_sub() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(
            (basepoint_projective + &basepoint_projective) - &basepoint_projective,
            basepoint_projective
        );
        assert_eq!(
            (basepoint_projective + &basepoint_affine) - &basepoint_affine,
            basepoint_projective
        );
        assert!(bool::from(
            (basepoint_projective - &basepoint_projective).is_identity()
        ));
    }

    #[test]
    fn projective_double_and_sub() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator.double() - &generator, generator);
    }

    #[test]
    fn randomized_coordinates_are_equal() {
        let p = ProjectivePoint::GENERATOR.double();
        let q = p.randomize(&FieldElement::from_u64(0xdead_beef));
        assert_eq!(p, q);
        assert_eq!(p.to_affine(), q.to_affine());
        assert_eq!(q.double(), p.double());
    }

    #[test]
    fn batch_normalize() {
        let g = ProjectivePoint::GENERATOR.double().randomize(&FieldElement::from_u64(5));
        let h = (g + ProjectivePoint::GENERATOR).randomize(&FieldElement::from_u64(11));

        let mut res = [AffinePoint::IDENTITY; 2];
        ProjectivePoint::batch_normalize(&[g, h], &mut res);
        assert_eq!(res, [g.to_affine(), h.to_affine()]);

        ProjectivePoint::batch_normalize(&[g, ProjectivePoint::IDENTITY], &mut res);
        assert_eq!(res, [g.to_affine(), AffinePoint::IDENTITY]);
    }

    #[test]
    fn sum_of_points() {
        let g = ProjectivePoint::GENERATOR;
        let total: ProjectivePoint = [g, g, g, -g].iter().sum();
        assert_eq!(total, g.double());
    }
}
