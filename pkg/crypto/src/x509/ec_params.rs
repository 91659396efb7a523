use asn::builtin::ObjectIdentifier;
use common::errors::*;
use pkix::{PKIX1Algorithms2008, PKIX1Algorithms88};

use crate::elliptic::EllipticCurveGroup;
use crate::x509::key_error::KeyParseError;

/// Resolves an `ECParameters` CHOICE (as found in a `SubjectPublicKeyInfo`
/// AlgorithmIdentifier or a SEC1 `ECPrivateKey`'s `[0]` field) into a group.
///
/// Only the `namedCurve` arm is implemented: the OID is matched against the
/// handful of curves `EllipticCurveGroup` knows how to construct. The
/// `specifiedCurve` arm (an inline `SpecifiedECDomain`) is recognized as a
/// distinct ASN.1 shape but always reports `FeatureUnavailable`, since the
/// vendored ASN.1 grammar used to generate this crate's `pkix` types does not
/// carry that production, so there is nothing to structurally match the
/// decoded field/curve/point/order against. `implicitlyCA` must be resolved
/// by the caller using a parent CA key, since it isn't self-contained.
pub fn resolve_named_curve(
    id: &ObjectIdentifier,
) -> core::result::Result<EllipticCurveGroup, KeyParseError> {
    if id == &PKIX1Algorithms2008::SECP192R1 {
        Ok(EllipticCurveGroup::secp192r1())
    } else if id == &PKIX1Algorithms2008::SECP224R1 {
        Ok(EllipticCurveGroup::secp224r1())
    } else if id == &PKIX1Algorithms2008::SECP256R1 {
        Ok(EllipticCurveGroup::secp256r1())
    } else if id == &PKIX1Algorithms2008::SECP384R1 {
        Ok(EllipticCurveGroup::secp384r1())
    } else if id == &PKIX1Algorithms2008::SECP521R1 {
        Ok(EllipticCurveGroup::secp521r1())
    } else {
        Err(KeyParseError::UnknownNamedCurve)
    }
}

/// Result of resolving an `EcpkParameters` value: the curve's canonical OID
/// (so it can be round-tripped or compared against another occurrence of the
/// same curve) plus the matching group.
pub struct ResolvedEcParams {
    pub group_id: ObjectIdentifier,
    pub group: EllipticCurveGroup,
}

/// Resolves `EcpkParameters`, requiring `namedCurve` (the only self-contained
/// form). `implicitlyCA` is handled by callers that have access to a parent
/// certificate's public key; `specifiedCurve` is out of scope (see
/// `resolve_named_curve`).
pub fn resolve_ecpk_parameters(
    params: &PKIX1Algorithms88::EcpkParameters,
) -> core::result::Result<ResolvedEcParams, KeyParseError> {
    match params {
        PKIX1Algorithms88::EcpkParameters::namedCurve(id) => {
            let group = resolve_named_curve(id)?;
            Ok(ResolvedEcParams {
                group_id: id.clone(),
                group,
            })
        }
        PKIX1Algorithms88::EcpkParameters::implicitlyCA(_) => Err(KeyParseError::FeatureUnavailable(
            "implicitlyCA EC parameters require a parent CA key",
        )),
        _ => Err(KeyParseError::FeatureUnavailable(
            "specified-domain EC parameters are not supported",
        )),
    }
}

/// Enforces the "curve-ID consistency" rule used by both the PKCS#8 and SEC1
/// decoders: once a group has been resolved from an outer context (e.g. a
/// PKCS#8 `privateKeyAlgorithm`), an inner, independently-specified set of
/// parameters (e.g. SEC1's own optional `[0] parameters`) must name the same
/// curve, or the whole key is malformed.
pub fn check_consistent(
    outer: &ObjectIdentifier,
    inner: &ObjectIdentifier,
) -> core::result::Result<(), KeyParseError> {
    if outer != inner {
        return Err(KeyParseError::InvalidFormat(
            "EC curve identifier mismatch between outer and inner parameters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_curves() {
        assert!(resolve_named_curve(&PKIX1Algorithms2008::SECP256R1).is_ok());
        assert!(resolve_named_curve(&PKIX1Algorithms2008::SECP521R1).is_ok());
    }

    #[test]
    fn rejects_unknown_curve() {
        // A real but unrelated OID (RSA encryption) should not resolve as a curve.
        let err = resolve_named_curve(&PKIX1Algorithms2008::RSAENCRYPTION).unwrap_err();
        assert_eq!(err, KeyParseError::UnknownNamedCurve);
    }
}
