//! Error types.

use core::fmt;

/// Result type with the `coinlib-secp256k1` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by the secp256k1 primitives.
///
/// Every fallible operation returns one of these as an explicit value and
/// never returns partial output alongside it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Malformed byte length or encoding.
    InvalidInput,

    /// Scalar is zero or not less than the curve order.
    InvalidScalar,

    /// Point is not on the curve, or is the identity where that is not allowed.
    InvalidPoint,

    /// Signature does not validate.
    VerificationFailed,

    /// Nonce derivation kept producing a zero `r` or `s` until the retry
    /// bound ran out.
    ArithmeticDegenerate,

    /// No public key could be reconstructed from a recoverable signature.
    RecoveryFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidInput => "malformed input length or encoding",
            Error::InvalidScalar => "scalar is zero or out of range",
            Error::InvalidPoint => "point is not a valid curve point",
            Error::VerificationFailed => "signature verification failed",
            Error::ArithmeticDegenerate => "degenerate nonce, retry bound exhausted",
            Error::RecoveryFailed => "public key recovery failed",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "signature")]
impl From<Error> for signature::Error {
    fn from(_: Error) -> signature::Error {
        signature::Error::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_is_distinct() {
        use std::string::ToString;

        let all = [
            Error::InvalidInput,
            Error::InvalidScalar,
            Error::InvalidPoint,
            Error::VerificationFailed,
            Error::ArithmeticDegenerate,
            Error::RecoveryFailed,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }
}
