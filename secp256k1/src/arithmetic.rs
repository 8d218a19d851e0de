//! A pure-Rust implementation of group operations on secp256k1.

#[macro_use]
mod macros;

pub(crate) mod affine;
pub(crate) mod field;
mod mul;
pub(crate) mod projective;
pub(crate) mod scalar;
mod util;

pub use self::{
    affine::AffinePoint, field::FieldElement, projective::ProjectivePoint, scalar::Scalar,
};

/// `b` in the curve equation `y² = x³ + b`.
pub(crate) const CURVE_EQUATION_B_SINGLE: u32 = 7u32;

/// [`CURVE_EQUATION_B_SINGLE`] as a field element.
pub(crate) const CURVE_EQUATION_B: FieldElement =
    FieldElement::from_u64(CURVE_EQUATION_B_SINGLE as u64);

#[cfg(test)]
mod tests {
    use super::{AffinePoint, CURVE_EQUATION_B, FieldElement, ProjectivePoint, Scalar};

    #[test]
    fn generator_satisfies_curve_equation() {
        let g = AffinePoint::GENERATOR;
        let lhs = g.y().square();
        let rhs = g.x().square() * g.x() + CURVE_EQUATION_B;
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn group_order_annihilates_generator() {
        // (n - 1)·G + G = n·G = O
        let minus_one = -Scalar::ONE;
        let sum = ProjectivePoint::mul_by_generator(&minus_one) + ProjectivePoint::GENERATOR;
        assert!(bool::from(sum.is_identity()));
    }

    #[test]
    fn no_point_with_zero_x() {
        assert!(bool::from(AffinePoint::lift_x(&FieldElement::ZERO).is_none()));
    }
}
