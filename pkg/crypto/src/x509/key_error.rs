use common::errors::*;

/// Error kinds produced while decoding a private or public key from DER/PEM.
///
/// Mirrors the error taxonomy used by the underlying ASN.1/PEM/EC/RSA
/// collaborators so that callers can match on a single enum instead of
/// string-sniffing an opaque `Error`.
#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// Structural ASN.1 violation, wrong tag, truncated input, or trailing
    /// bytes left over after a structure was fully consumed.
    #[fail(display = "Invalid key format: {}", _0)]
    InvalidFormat(&'static str),

    /// PKCS#1/SEC1/PKCS#8 version field did not match the one supported
    /// value.
    #[fail(display = "Invalid key version")]
    InvalidVersion,

    /// AlgorithmIdentifier was malformed (e.g. RSA with non-NULL
    /// parameters).
    #[fail(display = "Invalid algorithm identifier: {}", _0)]
    InvalidAlgorithm(&'static str),

    /// The algorithm OID was not recognized at all.
    #[fail(display = "Unknown public key algorithm")]
    UnknownAlgorithm,

    /// EC parameters referenced a named curve (or structurally matched no
    /// curve in the registry) that isn't supported.
    #[fail(display = "Unknown named curve")]
    UnknownNamedCurve,

    /// A feature that the underlying EC/RSA primitives don't implement was
    /// required to finish parsing (e.g. compressed points on a curve we
    /// can't decompress, or characteristic-2 specified domains).
    #[fail(display = "Feature unavailable: {}", _0)]
    FeatureUnavailable(&'static str),

    /// The key failed a mathematical sanity check (RSA CRT completion, EC
    /// point-on-curve, scalar range, etc).
    #[fail(display = "Invalid key: {}", _0)]
    InvalidKey(&'static str),
}

pub type KeyParseResult<T> = core::result::Result<T, KeyParseError>;

/// Converts a `KeyParseError` encountered deep in a fallback ladder into the
/// generic `common::errors::Error` used at the public API boundary, while
/// still letting callers `downcast_ref::<KeyParseError>()` if they need the
/// structured kind.
pub fn wrap(e: KeyParseError) -> Error {
    e.into()
}
