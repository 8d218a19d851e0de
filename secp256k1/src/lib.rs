#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! ## Contexts
//!
//! Operations that touch secret keys go through a [`Context`] whose
//! capability is fixed by its type parameter: a [`Context<VerifyOnly>`]
//! simply has no signing methods. Give each thread its own context when
//! re-seeding the blinding state.
//!
//! ```
//! # #[cfg(all(feature = "ecdsa", feature = "std"))]
//! # {
//! use coinlib_secp256k1::{Context, SecretKey};
//!
//! let ctx = Context::new();
//! let secret_key = SecretKey::from_bytes(&[0x42; 32])?;
//! let public_key = ctx.public_key(&secret_key);
//!
//! let digest = [0x11; 32];
//! let signature = ctx.sign_ecdsa(&digest, &secret_key)?;
//! ctx.verify_ecdsa(&digest, &signature, &public_key)?;
//! # }
//! # Ok::<(), coinlib_secp256k1::Error>(())
//! ```

#[cfg(feature = "alloc")]
#[allow(unused_extern_crates)]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod arithmetic;
mod context;
mod error;
mod hash;
mod keys;

#[cfg(feature = "ecdh")]
pub mod ecdh;

#[cfg(feature = "ecdsa")]
pub mod ecdsa;

#[cfg(feature = "schnorr")]
pub mod schnorr;

pub use crate::{
    arithmetic::{AffinePoint, FieldElement, ProjectivePoint, Scalar},
    context::{All, Capability, Context, SignOnly, Signing, Verification, VerifyOnly},
    error::{Error, Result},
    hash::tagged_sha256,
    keys::{Keypair, Parity, PublicKey, SecretKey, XOnlyPublicKey},
};
pub use elliptic_curve::{self, bigint::U256, consts::U32};

#[cfg(feature = "signature")]
pub use signature;

use elliptic_curve::{
    FieldBytesEncoding, bigint::ArrayEncoding, consts::U33, generic_array::GenericArray,
};

/// Order of the secp256k1 group (i.e. scalar modulus) serialized as
/// hexadecimal.
///
/// ```text
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
/// ```
const ORDER_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

/// secp256k1 elliptic curve.
///
/// Specified in Certicom's SECG in SEC 2: Recommended Elliptic Curve Domain
/// Parameters:
///
/// <https://www.secg.org/sec2-v2.pdf>
///
/// The curve's equation is `y² = x³ + 7` over a ~256-bit prime field.
///
/// It's primarily notable for its use in Bitcoin and other cryptocurrencies,
/// particularly in conjunction with the Elliptic Curve Digital Signature
/// Algorithm (ECDSA).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub struct Secp256k1;

impl elliptic_curve::Curve for Secp256k1 {
    /// 32-byte serialized field elements.
    type FieldBytesSize = U32;

    /// 256-bit integer type used for internally representing field elements.
    type Uint = U256;

    /// Curve order.
    const ORDER: U256 = U256::from_be_hex(ORDER_HEX);
}

impl elliptic_curve::PrimeCurve for Secp256k1 {}

impl elliptic_curve::point::PointCompression for Secp256k1 {
    /// secp256k1 points are typically compressed.
    const COMPRESS_POINTS: bool = true;
}

/// Compressed SEC1-encoded secp256k1 curve point.
pub type CompressedPoint = GenericArray<u8, U33>;

/// SEC1-encoded secp256k1 curve point.
pub type EncodedPoint = elliptic_curve::sec1::EncodedPoint<Secp256k1>;

/// secp256k1 field element serialized as bytes.
///
/// Byte array containing a serialized field element value (base field or scalar).
pub type FieldBytes = elliptic_curve::FieldBytes<Secp256k1>;

impl FieldBytesEncoding<Secp256k1> for U256 {
    fn decode_field_bytes(field_bytes: &FieldBytes) -> Self {
        U256::from_be_byte_array(*field_bytes)
    }

    fn encode_field_bytes(&self) -> FieldBytes {
        self.to_be_byte_array()
    }
}
