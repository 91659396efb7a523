use alloc::string::String;
use alloc::vec::Vec;
use std::convert::TryInto;

use asn::builtin::{Null, ObjectIdentifier, OctetString};
use asn::encoding::{der_eq, DERReadable, DERWriteable};
use common::bytes::Bytes;
use common::errors::*;
use pkix::{PKIX1Algorithms2008, PKIX1Explicit88, PKIX1_PSS_OAEP_Algorithms};
use pkix::{PKIX1Algorithms88, PKCS_8};
use pkix::{Safecurves_pkix_18, PKCS_1};

use crate::dh::DiffieHellmanFn;
use crate::elliptic::{EdwardsCurveGroup, EllipticCurveGroup};
use crate::pem::{
    PEMBuilder, PEM, PEM_EC_PRIVATE_KEY_LABEL, PEM_PRIVATE_KEY_LABEL, PEM_RSA_PRIVATE_KEY_LABEL,
};
use crate::rsa::RSAPrivateKey;
use crate::x509::ec_params::{check_consistent, resolve_ecpk_parameters, resolve_named_curve};
use crate::x509::key_error::KeyParseError;
use crate::x509::signature_algorithm::*;
use crate::x509::signature_key::*;
use crate::x509::PublicKey;

pub enum PrivateKeyType {
    Ed25519,
    ECDSA_SECP256R1,
}

#[derive(Debug, Clone)]
pub enum PrivateKey {
    RSA(RSAPrivateKey),

    RSASSA_PSS(
        RSAPrivateKey,
        Option<PKIX1_PSS_OAEP_Algorithms::RSASSA_PSS_params>,
    ),

    /// (GroupId, Group, Key)
    ECDSA(ObjectIdentifier, EllipticCurveGroup, Bytes),

    Ed25519(Bytes),
}

impl PrivateKey {
    /// Uses default parameters to generate a private key.
    pub async fn generate_default() -> Result<Self> {
        Self::generate(PrivateKeyType::Ed25519).await
    }

    pub async fn generate(typ: PrivateKeyType) -> Result<Self> {
        Ok(match typ {
            PrivateKeyType::Ed25519 => Self::Ed25519(
                EdwardsCurveGroup::ed25519()
                    .generate_private_key()
                    .await
                    .into(),
            ),
            PrivateKeyType::ECDSA_SECP256R1 => {
                let id = PKIX1Algorithms2008::SECP256R1;
                let group = EllipticCurveGroup::secp256r1();
                let key = group.secret_value().await?;
                Self::ECDSA(id, group, key.into())
            }
        })
    }

    /// Parses a private key from either PEM or raw DER bytes.
    ///
    /// PEM input is tried first, attempting each of the three envelope
    /// labels this format supports in turn ("RSA PRIVATE KEY", "EC PRIVATE
    /// KEY", "PRIVATE KEY"). If the input doesn't look like PEM at all (no
    /// recognized markers, or the bytes aren't NUL-terminated text), it is
    /// treated as raw DER and tried against PKCS#8, then PKCS#1, then SEC1
    /// in that order, mirroring the common multi-format `pk_parse_key`
    /// fallback ladder used by TLS libraries that accept "just give me a
    /// private key" input.
    pub fn from_pem(data: Bytes) -> Result<Self> {
        if data.is_empty() {
            return Err(KeyParseError::InvalidFormat("empty input").into());
        }

        let looks_like_pem = data.last() == Some(&0) || data.windows(11).any(|w| w == b"-----BEGIN ");

        if looks_like_pem {
            if let Some(pem) = PEM::parse(data.clone()).ok() {
                for entry in &pem.entries {
                    match entry.label.as_str() {
                        l if l == PEM_RSA_PRIVATE_KEY_LABEL => {
                            let body = entry.to_binary()?;
                            let key = Self::rsa_from_pkcs1_der(&body)?;
                            return Ok(Self::RSA(key));
                        }
                        l if l == PEM_EC_PRIVATE_KEY_LABEL => {
                            let body = entry.to_binary()?;
                            let (group_id, group, key) = Self::ec_from_sec1_der(&body, None)?;
                            return Ok(Self::ECDSA(group_id, group, key));
                        }
                        l if l == PEM_PRIVATE_KEY_LABEL => {
                            let body = entry.to_binary()?;
                            return Self::from_pkcs8_der(&body);
                        }
                        _ => continue,
                    }
                }
            }
        }

        Self::from_der(&data)
    }

    /// Parses a raw (non-PEM-armored) DER private key, trying PKCS#8, then
    /// PKCS#1, then SEC1, matching the fallback order used when no PEM
    /// envelope was recognized.
    pub fn from_der(data: &[u8]) -> Result<Self> {
        if let Ok(key) = Self::from_pkcs8_der(data) {
            return Ok(key);
        }

        if let Ok(key) = Self::rsa_from_pkcs1_der(data) {
            return Ok(Self::RSA(key));
        }

        if let Ok((group_id, group, key)) = Self::ec_from_sec1_der(data, None) {
            return Ok(Self::ECDSA(group_id, group, key));
        }

        Err(KeyParseError::InvalidFormat("key did not match any known format").into())
    }

    fn rsa_from_pkcs1_der(data: &[u8]) -> Result<RSAPrivateKey> {
        let pkey = PKCS_1::RSAPrivateKey::from_der(Bytes::from(data.to_vec()))?;

        if pkey.version != PKCS_1::Version::two_prime {
            return Err(KeyParseError::InvalidVersion.into());
        }

        Ok((&pkey).try_into()?)
    }

    /// Decodes a SEC1 `ECPrivateKey`. `outer_params` is the curve already
    /// resolved from an enclosing PKCS#8 `privateKeyAlgorithm`, if any; when
    /// present, SEC1's own optional `[0] parameters` field (if given) must
    /// name the same curve.
    fn ec_from_sec1_der(
        data: &[u8],
        outer_params: Option<(&ObjectIdentifier, &EllipticCurveGroup)>,
    ) -> Result<(ObjectIdentifier, EllipticCurveGroup, Bytes)> {
        let pkey = PKIX1Algorithms2008::ECPrivateKey::from_der(Bytes::from(data.to_vec()))?;

        if pkey.version != PKIX1Algorithms2008::ecprivatekey::Version::ecPrivkeyVer1 {
            return Err(KeyParseError::InvalidVersion.into());
        }

        let scalar = pkey.privateKey.to_bytes();

        let (group_id, group) = match (&pkey.parameters, outer_params) {
            (Some(PKIX1Algorithms2008::ECParameters::namedCurve(id)), Some((outer_id, outer_group))) => {
                check_consistent(outer_id, id)?;
                (outer_id.clone(), outer_group.clone())
            }
            (Some(PKIX1Algorithms2008::ECParameters::namedCurve(id)), None) => {
                (id.clone(), resolve_named_curve(id)?)
            }
            (None, Some((outer_id, outer_group))) => (outer_id.clone(), outer_group.clone()),
            (None, None) => {
                return Err(KeyParseError::InvalidFormat(
                    "SEC1 key has no curve parameters and none were inherited",
                )
                .into())
            }
            _ => {
                return Err(KeyParseError::FeatureUnavailable(
                    "specified-domain EC parameters are not supported",
                )
                .into())
            }
        };

        group.check_private_key(&crate::elliptic::decode_private_scalar(&scalar, &group)?)?;

        // The public point is optional; if present we trust it after
        // validating it is actually on the curve. Compressed points (or an
        // absent public key) fall back to recomputing Q = d*G.
        if let Some(public_key_bits) = &pkey.publicKey {
            match group.decode_point(public_key_bits.data.as_ref()) {
                Ok(_) => {}
                Err(e) => {
                    if !matches!(
                        e.downcast_ref::<KeyParseError>(),
                        Some(KeyParseError::FeatureUnavailable(_))
                    ) {
                        return Err(e);
                    }
                }
            }
        }

        Ok((group_id, group, scalar.into()))
    }

    fn from_pkcs8_der(data: &[u8]) -> Result<Self> {
        let pkey_info = pkix::PKCS_8::PrivateKeyInfo::from_der(Bytes::from(data.to_vec()))?;

        if pkey_info.version != PKCS_8::Version::v1 {
            return Err(KeyParseError::InvalidVersion.into());
        }

        let check_null_params = || -> Result<()> {
            if !der_eq(&pkey_info.privateKeyAlgorithm.parameters, &Null::new()) {
                return Err(KeyParseError::InvalidAlgorithm("expected null parameters for RSA").into());
            }
            Ok(())
        };

        if pkey_info.privateKeyAlgorithm.algorithm == PKCS_1::RSAENCRYPTION {
            check_null_params()?;
            let key = Self::rsa_from_pkcs1_der(pkey_info.privateKey.to_bytes().as_ref())?;
            return Ok(Self::RSA(key));
        } else if pkey_info.privateKeyAlgorithm.algorithm == PKIX1Algorithms2008::ID_ECPUBLICKEY {
            let params = match &pkey_info.privateKeyAlgorithm.parameters {
                Some(any) => any.parse_as::<PKIX1Algorithms88::EcpkParameters>()?,
                None => {
                    return Err(KeyParseError::InvalidAlgorithm("no EC parameters specified").into());
                }
            };

            let resolved = resolve_ecpk_parameters(&params)?;

            let inner = Into::<OctetString>::into(pkey_info.privateKey.clone()).to_bytes();
            let (group_id, group, key) =
                Self::ec_from_sec1_der(inner.as_ref(), Some((&resolved.group_id, &resolved.group)))?;

            return Ok(Self::ECDSA(group_id, group, key));
        } else if pkey_info.privateKeyAlgorithm.algorithm == pkix::Safecurves_pkix_18::ID_ED25519 {
            if !pkey_info.privateKeyAlgorithm.parameters.is_none() {
                return Err(KeyParseError::InvalidAlgorithm(
                    "Ed25519 keys must not have algorithm parameters",
                )
                .into());
            }

            let key: OctetString = pkix::Safecurves_pkix_18::CurvePrivateKey::from_der(
                Into::<OctetString>::into(pkey_info.privateKey.clone()).to_bytes(),
            )?
            .into();

            if key.len() != 32 {
                return Err(KeyParseError::InvalidFormat("wrong length of Ed25519 private key").into());
            }

            return Ok(Self::Ed25519(key.into_bytes()));
        }

        Err(KeyParseError::UnknownAlgorithm.into())
    }

    pub fn to_pem(&self) -> String {
        PEMBuilder::default()
            .add_binary_entry(PEM_PRIVATE_KEY_LABEL, &self.to_asn1().to_der())
            .build()
    }

    pub fn to_asn1(&self) -> pkix::PKCS_8::PrivateKeyInfo {
        match self {
            PrivateKey::RSA(_) => todo!(),
            PrivateKey::RSASSA_PSS(_, _) => todo!(),
            PrivateKey::ECDSA(group_id, group, key) => {
                // See
                // https://datatracker.ietf.org/doc/html/rfc5915

                // NOTE: It's a bit inconclusive as to whether or not we should put the
                // parameters in privateKeyAlgorithm or ECPrivateKey but for safety, we put them
                // in both.

                let private_key = PKIX1Algorithms2008::ECPrivateKey {
                    version: PKIX1Algorithms2008::ecprivatekey::Version::ecPrivkeyVer1,
                    privateKey: OctetString(asn::builtin::BytesRef::Dynamic(key.clone())),
                    parameters: Some(PKIX1Algorithms2008::ECParameters::namedCurve(
                        group_id.clone(),
                    )),
                    // TODO:
                    publicKey: None,
                };

                pkix::PKCS_8::PrivateKeyInfo {
                    version: pkix::PKCS_8::Version::v1,
                    privateKeyAlgorithm: PKIX1Explicit88::AlgorithmIdentifier {
                        algorithm: PKIX1Algorithms2008::ID_ECPUBLICKEY,
                        parameters: Some(asn_any!(PKIX1Algorithms88::EcpkParameters::namedCurve(
                            group_id.clone()
                        ))),
                    },
                    privateKey: PKCS_8::PrivateKey::from(OctetString(
                        asn::builtin::BytesRef::Dynamic(private_key.to_der().into()),
                    )),
                }
            }
            PrivateKey::Ed25519(private_key) => {
                let key = pkix::Safecurves_pkix_18::CurvePrivateKey::from(OctetString(
                    asn::builtin::BytesRef::Dynamic(private_key.clone()),
                ))
                .to_der();

                pkix::PKCS_8::PrivateKeyInfo {
                    version: pkix::PKCS_8::Version::v1,
                    privateKeyAlgorithm: PKIX1Explicit88::AlgorithmIdentifier {
                        algorithm: pkix::Safecurves_pkix_18::ID_ED25519,
                        parameters: None,
                    },
                    privateKey: PKCS_8::PrivateKey::from(OctetString(
                        asn::builtin::BytesRef::Dynamic(key.into()),
                    )),
                }
            }
        }
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        Ok(match self {
            PrivateKey::RSA(key) => PublicKey::RSA(key.as_public()),
            PrivateKey::RSASSA_PSS(key, params) => {
                PublicKey::RSASSA_PSS(key.as_public(), params.clone())
            }
            PrivateKey::ECDSA(group_id, group, private_key) => {
                let public_value = group.public_value(&private_key)?;
                PublicKey::EC(group_id.clone(), group.clone(), public_value.into())
            }
            PrivateKey::Ed25519(private_key) => {
                let ed = EdwardsCurveGroup::ed25519();
                let public_key = ed.public_key(&private_key)?;
                PublicKey::Ed25519(public_key.into())
            }
        })
    }

    /// Gets a reasonable default signing algorithm that can be used with this
    /// key.
    pub fn default_signature_algorithm(&self) -> PKIX1Explicit88::AlgorithmIdentifier {
        // TODO: Move this to some config files?

        match self {
            PrivateKey::RSA(_) => PKIX1Explicit88::AlgorithmIdentifier {
                algorithm: PKIX1Algorithms2008::SHA256WITHRSAENCRYPTION,
                parameters: Some(asn_any!(Null::new())),
            },
            PrivateKey::RSASSA_PSS(_, _) => todo!(),
            PrivateKey::ECDSA(group_id, _, _) => {
                let algorithm = {
                    if group_id == &PKIX1Algorithms2008::SECP192R1 {
                        PKIX1Algorithms2008::ECDSA_WITH_SHA256
                    } else if group_id == &PKIX1Algorithms2008::SECP224R1 {
                        PKIX1Algorithms2008::ECDSA_WITH_SHA256
                    } else if group_id == &PKIX1Algorithms2008::SECP256R1 {
                        PKIX1Algorithms2008::ECDSA_WITH_SHA256
                    } else if group_id == &PKIX1Algorithms2008::SECP384R1 {
                        PKIX1Algorithms2008::ECDSA_WITH_SHA384
                    } else if group_id == &PKIX1Algorithms2008::SECP521R1 {
                        PKIX1Algorithms2008::ECDSA_WITH_SHA512
                    } else {
                        // We don't support other curves.
                        todo!()
                    }
                };

                PKIX1Explicit88::AlgorithmIdentifier {
                    algorithm,
                    parameters: None,
                }
            }
            PrivateKey::Ed25519(_) => PKIX1Explicit88::AlgorithmIdentifier {
                algorithm: Safecurves_pkix_18::ID_ED25519,
                parameters: None,
            },
        }
    }

    /// Checks if the given signature algorithm can be used with this key.
    /// For unknown/unsupported algorithms, this will return false.
    pub fn can_create_signature(
        &self,
        signature_algorithm: &PKIX1Explicit88::AlgorithmIdentifier,
        constraints: &SignatureKeyConstraints,
    ) -> Result<bool> {
        let sk = match self {
            Self::RSA(_) => SignatureKeyParameters::RSA,
            Self::RSASSA_PSS(_, params) => SignatureKeyParameters::RSASSA_PSS(params.clone()),
            Self::ECDSA(_, group, _) => SignatureKeyParameters::ECDSA(group.clone()),
            Self::Ed25519(_) => SignatureKeyParameters::Ed25519,
        };

        sk.can_use_with(signature_algorithm, constraints)
    }

    pub async fn create_signature(
        &self,
        plaintext: &[u8],
        signature_algorithm: &PKIX1Explicit88::AlgorithmIdentifier,
        constraints: &SignatureKeyConstraints,
    ) -> Result<Vec<u8>> {
        if !self.can_create_signature(signature_algorithm, constraints)? {
            return Err(err_msg(
                "Signature algorithm not compatible with private key",
            ));
        }

        match DigitalSignatureAlgorithm::create(signature_algorithm)? {
            DigitalSignatureAlgorithm::RSASSA_PKCS_v1_5(rsa) => {
                return rsa.create_signature(self.as_rsa_key()?, plaintext);
            }
            DigitalSignatureAlgorithm::RSASSA_PSS(rsa) => {
                return rsa.create_signature(self.as_rsa_key()?, plaintext).await;
            }
            DigitalSignatureAlgorithm::Ed25519(group) => {
                return group.create_signature(self.as_ed25519_key()?, plaintext);
            }
            DigitalSignatureAlgorithm::EcDSA(hasher_factory) => {
                let mut hasher = hasher_factory.create();
                let (_, group, point) = self.as_ec_key()?;
                return group
                    .create_signature(
                        point.as_ref(),
                        plaintext,
                        constraints
                            .ecdsa_signature_format
                            .unwrap_or(crate::elliptic::EllipticCurveSignatureFormat::X509),
                        hasher.as_mut(),
                    )
                    .await;
            }
        }
    }

    fn as_ec_key(&self) -> Result<(&ObjectIdentifier, &EllipticCurveGroup, &Bytes)> {
        match self {
            Self::ECDSA(a, b, c) => Ok((a, b, c)),
            _ => Err(err_msg("Expected an EC public key")),
        }
    }

    fn as_ed25519_key(&self) -> Result<&[u8]> {
        match self {
            Self::Ed25519(v) => Ok(v.as_ref()),
            _ => Err(err_msg("Expected an Ed25519 public key")),
        }
    }

    fn as_rsa_key(&self) -> Result<&RSAPrivateKey> {
        match self {
            Self::RSA(v) => Ok(v),
            _ => Err(err_msg("Expected an RSA public key")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_PKCS1_PEM: &'static str = include_str!("testdata/rsa_pkcs1.pem");
    const RSA_PKCS8_PEM: &'static str = include_str!("testdata/rsa_pkcs8.pem");
    const EC_SEC1_PEM: &'static str = include_str!("testdata/ec_sec1.pem");
    const EC_PKCS8_PEM: &'static str = include_str!("testdata/ec_pkcs8.pem");

    #[test]
    fn parses_rsa_pkcs1_pem() -> Result<()> {
        let key = PrivateKey::from_pem(Bytes::from(RSA_PKCS1_PEM.as_bytes().to_vec()))?;
        assert!(matches!(key, PrivateKey::RSA(_)));
        Ok(())
    }

    #[test]
    fn parses_rsa_pkcs8_pem() -> Result<()> {
        let key = PrivateKey::from_pem(Bytes::from(RSA_PKCS8_PEM.as_bytes().to_vec()))?;
        assert!(matches!(key, PrivateKey::RSA(_)));
        Ok(())
    }

    #[test]
    fn parses_ec_sec1_pem() -> Result<()> {
        let key = PrivateKey::from_pem(Bytes::from(EC_SEC1_PEM.as_bytes().to_vec()))?;
        match key {
            PrivateKey::ECDSA(id, _, scalar) => {
                assert_eq!(id, PKIX1Algorithms2008::SECP256R1);
                assert_eq!(scalar.len(), 32);
            }
            _ => panic!("expected an ECDSA key"),
        }
        Ok(())
    }

    #[test]
    fn parses_ec_pkcs8_pem() -> Result<()> {
        let key = PrivateKey::from_pem(Bytes::from(EC_PKCS8_PEM.as_bytes().to_vec()))?;
        assert!(matches!(key, PrivateKey::ECDSA(_, _, _)));
        Ok(())
    }

    #[test]
    fn sec1_key_without_embedded_public_key_recomputes_it() -> Result<()> {
        let der = include_bytes!("testdata/ec_sec1_no_pub.der");
        let (_, group, scalar) = PrivateKey::ec_from_sec1_der(der, None)?;
        let public = group.public_value(&scalar)?;
        assert_eq!(public[0], 0x04);
        Ok(())
    }

    #[test]
    fn sec1_key_with_compressed_public_key_still_parses() -> Result<()> {
        let der = include_bytes!("testdata/ec_sec1_compressed_pub.der");
        let (_, _, scalar) = PrivateKey::ec_from_sec1_der(der, None)?;
        assert_eq!(scalar.len(), 32);
        Ok(())
    }

    #[test]
    fn sec1_key_rejects_bad_version() {
        let der = include_bytes!("testdata/ec_sec1_bad_version.der");
        let err = PrivateKey::ec_from_sec1_der(der, None).unwrap_err();
        assert!(err.downcast_ref::<KeyParseError>().is_some());
    }

    #[test]
    fn empty_input_is_invalid_format() {
        let err = PrivateKey::from_pem(Bytes::from_static(b"")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn empty_sequence_is_invalid_format() {
        let err = PrivateKey::from_der(&[0x30, 0x00]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_pkcs1_wrong_version() {
        let der = include_bytes!("testdata/rsa_pkcs1_bad_version.der");
        let err = PrivateKey::from_der(der).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidVersion)
        ));
    }

    #[test]
    fn rejects_pkcs1_with_trailing_bytes() {
        let der = include_bytes!("testdata/rsa_pkcs1_trailing_byte.der");
        assert!(PrivateKey::from_der(der).is_err());
    }

    #[test]
    fn rejects_rsa_public_exponent_of_one() {
        let der = include_bytes!("testdata/rsa_pkcs1_bad_e.der");
        let err = PrivateKey::rsa_from_pkcs1_der(der).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidKey(_))
        ));
    }

    #[test]
    fn rejects_rsa_equal_primes() {
        let der = include_bytes!("testdata/rsa_pkcs1_bad_pq.der");
        let err = PrivateKey::rsa_from_pkcs1_der(der).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidKey(_))
        ));
    }

    #[test]
    fn pkcs8_curve_mismatch_between_outer_and_inner_is_invalid_format() {
        let der = include_bytes!("testdata/ec_pkcs8_curve_mismatch.der");
        let err = PrivateKey::from_pkcs8_der(der).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyParseError>(),
            Some(KeyParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parses_ed25519_pkcs8_pem() -> Result<()> {
        const ED25519_PEM: &'static str = include_str!("testdata/ed25519_pkcs8.pem");
        let key = PrivateKey::from_pem(Bytes::from(ED25519_PEM.as_bytes().to_vec()))?;
        match key {
            PrivateKey::Ed25519(scalar) => assert_eq!(scalar.len(), 32),
            _ => panic!("expected an Ed25519 key"),
        }
        Ok(())
    }

    #[test]
    fn raw_der_without_pem_markers_is_parsed_via_fallback_ladder() -> Result<()> {
        let der = include_bytes!("testdata/rsa_pkcs1.der");
        let key = PrivateKey::from_pem(Bytes::from(der.to_vec()))?;
        assert!(matches!(key, PrivateKey::RSA(_)));
        Ok(())
    }

    #[test]
    fn idempotent_across_der_and_pem_forms_for_ec() -> Result<()> {
        let der = include_bytes!("testdata/ec_sec1_full.der");
        let (der_id, _, der_scalar) = PrivateKey::ec_from_sec1_der(der, None)?;

        let pem_key = PrivateKey::from_pem(Bytes::from(EC_SEC1_PEM.as_bytes().to_vec()))?;
        match pem_key {
            PrivateKey::ECDSA(pem_id, _, pem_scalar) => {
                assert_eq!(der_id, pem_id);
                assert_eq!(der_scalar, pem_scalar);
            }
            _ => panic!("expected an ECDSA key"),
        }
        Ok(())
    }
}
