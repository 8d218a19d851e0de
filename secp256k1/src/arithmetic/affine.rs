//! Affine points

use super::{CURVE_EQUATION_B, FieldElement, ProjectivePoint};
use crate::{EncodedPoint, Error, FieldBytes, Result};
use core::ops::Neg;
use elliptic_curve::{
    sec1::Coordinates,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption},
    zeroize::DefaultIsZeroes,
};

/// SEC1 tag bytes.
const TAG_COMPRESSED_EVEN: u8 = 0x02;
const TAG_COMPRESSED_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;
const TAG_HYBRID_EVEN: u8 = 0x06;
const TAG_HYBRID_ODD: u8 = 0x07;

/// secp256k1 curve point expressed in affine coordinates.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    /// x-coordinate
    pub(crate) x: FieldElement,

    /// y-coordinate
    pub(crate) y: FieldElement,

    /// Is this point the point at infinity? 0 = no, 1 = yes
    ///
    /// Kept as a `u8` rather than a [`Choice`] so `IDENTITY` and `GENERATOR`
    /// can be `const`.
    pub(crate) infinity: u8,
}

impl AffinePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Base point of secp256k1.
    ///
    /// ```text
    /// Gₓ = 79be667e f9dcbbac 55a06295 ce870b07 029bfcdb 2dce28d9 59f2815b 16f81798
    /// Gᵧ = 483ada77 26a3c465 5da4fbfc 0e1108a8 fd17b448 a6855419 9c47d08f fb10d4b8
    /// ```
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_limbs_unchecked([
            0x59F2_815B_16F8_1798,
            0x029B_FCDB_2DCE_28D9,
            0x55A0_6295_CE87_0B07,
            0x79BE_667E_F9DC_BBAC,
        ]),
        y: FieldElement::from_limbs_unchecked([
            0x9C47_D08F_FB10_D4B8,
            0xFD17_B448_A685_5419,
            0x5DA4_FBFC_0E11_08A8,
            0x483A_DA77_26A3_C465,
        ]),
        infinity: 0,
    };

    /// Create a new [`AffinePoint`] with the given coordinates.
    ///
    /// The coordinates are not validated.
    pub(crate) const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    /// Builds a point from coordinates, checking the curve equation.
    pub fn from_coordinates(x: &FieldElement, y: &FieldElement) -> CtOption<Self> {
        let point = Self::new(*x, *y);
        CtOption::new(point, point.is_on_curve())
    }

    /// Recovers the point with the given x-coordinate and y parity.
    ///
    /// Fails if `x³ + 7` is not a square, i.e. `x` is not on the curve.
    pub fn decompress(x: &FieldElement, y_is_odd: Choice) -> CtOption<Self> {
        let alpha = x.square() * x + CURVE_EQUATION_B;
        alpha.sqrt().map(|beta| {
            let y = FieldElement::conditional_select(&-beta, &beta, beta.is_odd().ct_eq(&y_is_odd));
            Self::new(*x, y)
        })
    }

    /// BIP340 `lift_x`: the point with the given x-coordinate and even y.
    pub fn lift_x(x: &FieldElement) -> CtOption<Self> {
        Self::decompress(x, Choice::from(0))
    }

    /// Is this point the identity point?
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Checks `y² = x³ + 7`. The identity is considered on the curve.
    pub fn is_on_curve(&self) -> Choice {
        let lhs = self.y.square();
        let rhs = self.x.square() * self.x + CURVE_EQUATION_B;
        lhs.ct_eq(&rhs) | self.is_identity()
    }

    /// Affine x-coordinate.
    pub fn x(&self) -> FieldElement {
        self.x
    }

    /// Affine y-coordinate.
    pub fn y(&self) -> FieldElement {
        self.y
    }

    /// Is the y-coordinate odd?
    pub fn y_is_odd(&self) -> Choice {
        self.y.is_odd()
    }

    /// Parses a SEC1 point: compressed (33 bytes), uncompressed or hybrid
    /// (65 bytes), or the single-byte identity encoding.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let (&tag, body) = bytes.split_first().ok_or(Error::InvalidInput)?;
        match (tag, body.len()) {
            (0x00, 0) => Ok(Self::IDENTITY),
            (TAG_COMPRESSED_EVEN | TAG_COMPRESSED_ODD, 32) => {
                let x = parse_coordinate(body)?;
                Option::from(Self::decompress(&x, Choice::from(tag & 1))).ok_or(Error::InvalidPoint)
            }
            (TAG_UNCOMPRESSED | TAG_HYBRID_EVEN | TAG_HYBRID_ODD, 64) => {
                let x = parse_coordinate(&body[..32])?;
                let y = parse_coordinate(&body[32..])?;
                let point: Self =
                    Option::from(Self::from_coordinates(&x, &y)).ok_or(Error::InvalidPoint)?;

                // Hybrid encodings repeat the y parity in the tag.
                if tag != TAG_UNCOMPRESSED && point.y.is_odd().unwrap_u8() != tag & 1 {
                    return Err(Error::InvalidPoint);
                }
                Ok(point)
            }
            _ => Err(Error::InvalidInput),
        }
    }

    /// 33-byte compressed SEC1 encoding. The identity encodes as all zeros.
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = TAG_COMPRESSED_EVEN | self.y.is_odd().unwrap_u8();
        out[1..].copy_from_slice(&self.x.to_bytes());
        conditional_zero(&mut out, self.is_identity());
        out
    }

    /// 65-byte uncompressed SEC1 encoding. The identity encodes as all zeros.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = TAG_UNCOMPRESSED;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        conditional_zero(&mut out, self.is_identity());
        out
    }

    /// Converts to an [`EncodedPoint`].
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        EncodedPoint::conditional_select(
            &EncodedPoint::from_affine_coordinates(
                &FieldBytes::from(self.x.to_bytes()),
                &FieldBytes::from(self.y.to_bytes()),
                compress,
            ),
            &EncodedPoint::identity(),
            self.is_identity(),
        )
    }

    /// Decodes an [`EncodedPoint`], validating it lies on the curve.
    pub fn from_encoded_point(encoded_point: &EncodedPoint) -> CtOption<Self> {
        match encoded_point.coordinates() {
            Coordinates::Identity => CtOption::new(Self::IDENTITY, Choice::from(1)),
            Coordinates::Compact { x } => decode_coordinate(x).and_then(|x| Self::lift_x(&x)),
            Coordinates::Compressed { x, y_is_odd } => decode_coordinate(x)
                .and_then(|x| Self::decompress(&x, Choice::from(y_is_odd as u8))),
            Coordinates::Uncompressed { x, y } => {
                let x = decode_coordinate(x);
                let y = decode_coordinate(y);
                x.and_then(|x| y.and_then(|y| Self::from_coordinates(&x, &y)))
            }
        }
    }
}

fn decode_coordinate(bytes: &FieldBytes) -> CtOption<FieldElement> {
    let mut repr = [0u8; 32];
    repr.copy_from_slice(bytes);
    FieldElement::from_bytes(&repr)
}

fn parse_coordinate(bytes: &[u8]) -> Result<FieldElement> {
    let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidInput)?;
    Option::from(FieldElement::from_bytes(bytes)).ok_or(Error::InvalidPoint)
}

fn conditional_zero(bytes: &mut [u8], choice: Choice) {
    for byte in bytes {
        byte.conditional_assign(&0, choice);
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &AffinePoint, b: &AffinePoint, choice: Choice) -> AffinePoint {
        AffinePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &AffinePoint) -> Choice {
        // Coordinates of the identity are ignored.
        let both_identity = self.is_identity() & other.is_identity();
        let same_point = self.x.ct_eq(&other.x)
            & self.y.ct_eq(&other.y)
            & self.infinity.ct_eq(&other.infinity);
        both_identity | same_point
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl Default for AffinePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DefaultIsZeroes for AffinePoint {}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self::Output {
        AffinePoint {
            x: self.x,
            y: -self.y,
            infinity: self.infinity,
        }
    }
}

impl Neg for &AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self::Output {
        -(*self)
    }
}

impl From<ProjectivePoint> for AffinePoint {
    fn from(p: ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl From<&ProjectivePoint> for AffinePoint {
    fn from(p: &ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl From<AffinePoint> for EncodedPoint {
    fn from(affine_point: AffinePoint) -> EncodedPoint {
        affine_point.to_encoded_point(true)
    }
}

impl TryFrom<&EncodedPoint> for AffinePoint {
    type Error = Error;

    fn try_from(point: &EncodedPoint) -> Result<AffinePoint> {
        Option::from(AffinePoint::from_encoded_point(point)).ok_or(Error::InvalidPoint)
    }
}
