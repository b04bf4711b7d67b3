pub mod extensions;
pub mod name;
pub mod params;

use std::path::Path;

use der::{Decode, Encode};
use extensions::{SubjectAltName, ToAndFromX509Extension};
use params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, SelfSignedParams};
use rsa::BigUint;
use sha1::{Digest, Sha1};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;

use crate::error::{CryptoError, Result};
use crate::issuer::Issuer;
use crate::key::{PrivateKey, PublicKey, PublicKeyDescriptor};
use crate::pem_utils::{self, CERTIFICATE_LABEL};

/// Represents an X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Parses a DER encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)
            .map_err(|e| CryptoError::CertificateError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses a PEM encoded certificate.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, &[CERTIFICATE_LABEL])?;
        Self::from_der(&der)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CryptoError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    /// Uppercase hex SHA-1 of the DER encoding, no separators.
    ///
    /// Always 40 digits: leading zero nibbles are kept, unlike the M2Crypto
    /// based tooling whose fingerprints could come out one digit short.
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha1::digest(self.to_der()?);
        Ok(digest.iter().map(|b| format!("{b:02X}")).collect())
    }

    /// DNS entries of the subjectAltName extension, empty when there is none.
    pub fn subject_alt_name(&self) -> Result<SubjectAltName> {
        let Some(extensions) = &self.inner.tbs_certificate.extensions else {
            return Ok(SubjectAltName::default());
        };
        match extensions.iter().find(|ext| ext.extn_id == SubjectAltName::OID) {
            Some(ext) => ExtensionParam::from(ext).to_extension(),
            None => Ok(SubjectAltName::default()),
        }
    }

    /// subjectAltName DNS entries in encoded order.
    pub fn dns_names(&self) -> Result<Vec<String>> {
        Ok(self.subject_alt_name()?.names)
    }

    /// Checks the signature against the certificate's own public key.
    pub fn verify_self_signature(&self) -> Result<()> {
        if self.inner.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION
        {
            return Err(CryptoError::SignatureError(format!(
                "unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }
        let public_key =
            PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)?;
        let tbs = self.inner.tbs_certificate.to_der()?;
        public_key.verify(&tbs, self.inner.signature.raw_bytes())
    }

    /// Creates a new self-signed certificate.
    ///
    /// The issuer is the subject of `cert_info`, and the signature is checked
    /// against the embedded public key before the certificate is returned.
    pub fn new_self_signed(
        cert_info: &CertificationRequestInfo,
        key: &PrivateKey,
        serial_number: u64,
        validity: params::Validity,
    ) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: cert_info.subject.clone(),
            key,
        };

        let certificate = self_issuer.issue(cert_info, serial_number, validity)?;
        certificate
            .verify_self_signature()
            .map_err(|e| CryptoError::CertificateError(e.to_string()))?;
        Ok(certificate)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a PrivateKey,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &PrivateKey {
        self.key
    }
}

/// Builds a self-signed certificate for `domains` with the default
/// [`SelfSignedParams`] and returns it PEM encoded.
///
/// The common name is `domains[0]`; every entry, the first included, goes into
/// the subjectAltName extension.
pub fn make_self_signed(key: &PrivateKey, domains: &[impl AsRef<str>]) -> Result<String> {
    make_self_signed_with(key, domains, &SelfSignedParams::default())
}

/// [`make_self_signed`] with explicit parameters.
pub fn make_self_signed_with(
    key: &PrivateKey,
    domains: &[impl AsRef<str>],
    params: &SelfSignedParams,
) -> Result<String> {
    let names: Vec<String> = domains.iter().map(|d| d.as_ref().to_string()).collect();
    let Some(common_name) = names.first() else {
        return Err(CryptoError::InvalidInput(
            "at least one domain is required".to_string(),
        ));
    };

    let cert_info = CertificationRequestInfo::builder()
        .subject(params.subject.with_common_name(common_name))
        .subject_public_key(key.public_key())
        .is_ca(params.is_ca)
        .extensions(vec![ExtensionParam::from_extension(
            SubjectAltName {
                names: names.clone(),
            },
            false,
        )?])
        .build();

    let validity = params::Validity::for_days(params.validity_days);
    let certificate =
        Certificate::new_self_signed(&cert_info, key, params.serial_number, validity)?;

    tracing::debug!(
        common_name = %common_name,
        san_count = names.len(),
        serial = params.serial_number,
        "issued self-signed certificate"
    );
    certificate.to_pem()
}

/// Metadata extracted from an X.509 certificate.
///
/// # Fields
/// * `not_before` / `not_after` - Validity window in UTC.
/// * `subject` / `issuer` - Rendered distinguished names, see [`name`].
/// * `cn` - Subject common name, if present.
/// * `serial` - Serial number.
/// * `san` - `DNS:a, DNS:b` listing, empty without a subjectAltName.
/// * `fingerprint` - Uppercase hex SHA-1 of the DER encoding.
/// * `pub_key` - Public key algorithm and size, e.g. `RSA 512`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertInfo {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub subject: String,
    pub issuer: String,
    pub cn: Option<String>,
    pub serial: BigUint,
    pub san: String,
    pub fingerprint: String,
    pub pub_key: PublicKeyDescriptor,
}

impl CertInfo {
    pub fn from_certificate(certificate: &Certificate) -> Result<Self> {
        let tbs = &certificate.inner.tbs_certificate;

        Ok(Self {
            not_before: to_offset_date_time(&tbs.validity.not_before),
            not_after: to_offset_date_time(&tbs.validity.not_after),
            subject: name::render_name(&tbs.subject),
            issuer: name::render_name(&tbs.issuer),
            cn: name::find_attribute(&tbs.subject, name::COMMON_NAME),
            serial: BigUint::from_bytes_be(tbs.serial_number.as_bytes()),
            san: certificate.subject_alt_name()?.to_string(),
            fingerprint: certificate.fingerprint()?,
            pub_key: PublicKeyDescriptor::from_x509spki(&tbs.subject_public_key_info)?,
        })
    }
}

fn to_offset_date_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}

/// Parses a PEM certificate and returns its metadata.
///
/// Unlike the validation helpers this expects trusted input: anything that
/// does not parse is returned as an error.
pub fn inspect(pem: impl AsRef<[u8]>) -> Result<CertInfo> {
    let certificate = Certificate::from_pem(pem)?;
    let info = CertInfo::from_certificate(&certificate)?;
    tracing::debug!(
        serial = %info.serial,
        fingerprint = %info.fingerprint,
        "inspected certificate"
    );
    Ok(info)
}

/// [`inspect`] for a PEM certificate stored at `path`.
pub fn inspect_file(path: impl AsRef<Path>) -> Result<CertInfo> {
    let path = path.as_ref();
    let pem = std::fs::read(path)
        .map_err(|e| CryptoError::IoError(format!("{}: {e}", path.display())))?;
    inspect(pem)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA512_KEY: &str = include_str!("../../tests/testdata/rsa512_key.pem");
    const CERT_SAN_PEM: &str = include_str!("../../tests/testdata/cert-san.pem");

    #[test]
    fn test_pem_der_round_trip_is_lossless() {
        let certificate = Certificate::from_pem(CERT_SAN_PEM).unwrap();
        assert_eq!(certificate.to_pem().unwrap(), CERT_SAN_PEM);
        let reparsed = Certificate::from_der(&certificate.to_der().unwrap()).unwrap();
        assert_eq!(reparsed.fingerprint().unwrap(), certificate.fingerprint().unwrap());
    }

    #[test]
    fn test_dns_names() {
        let certificate = Certificate::from_pem(CERT_SAN_PEM).unwrap();
        assert_eq!(
            certificate.dns_names().unwrap(),
            vec!["example.com", "www.example.com"]
        );

        let certificate =
            Certificate::from_pem(include_str!("../../tests/testdata/cert.pem")).unwrap();
        assert!(certificate.dns_names().unwrap().is_empty());
    }

    #[test]
    fn test_fixture_self_signature_verifies() {
        let certificate = Certificate::from_pem(CERT_SAN_PEM).unwrap();
        assert!(certificate.verify_self_signature().is_ok());
    }

    #[test]
    fn test_new_self_signed_with_custom_params() {
        let key = PrivateKey::from_pem(RSA512_KEY).unwrap();
        let params = SelfSignedParams::builder()
            .serial_number(42)
            .validity_days(30)
            .is_ca(true)
            .build();
        let pem = make_self_signed_with(&key, &["ca.example.com"], &params).unwrap();

        let info = inspect(&pem).unwrap();
        assert_eq!(info.serial, BigUint::from(42u32));
        assert_eq!(info.not_after - info.not_before, time::Duration::days(30));
        assert_eq!(info.cn.as_deref(), Some("ca.example.com"));

        let certificate = Certificate::from_pem(&pem).unwrap();
        let basic_constraints = certificate
            .inner
            .tbs_certificate
            .extensions
            .as_ref()
            .unwrap()
            .iter()
            .find(|ext| ext.extn_id == extensions::BasicConstraints::OID)
            .map(ExtensionParam::from)
            .unwrap()
            .to_extension::<extensions::BasicConstraints>()
            .unwrap();
        assert!(basic_constraints.is_ca);
    }

    #[test]
    fn test_make_self_signed_rejects_empty_domains() {
        let key = PrivateKey::from_pem(RSA512_KEY).unwrap();
        let domains: [&str; 0] = [];
        assert!(matches!(
            make_self_signed(&key, &domains),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tampered_certificate_fails_verification() {
        let key = PrivateKey::from_pem(RSA512_KEY).unwrap();
        let pem = make_self_signed(&key, &["example.com"]).unwrap();
        let mut certificate = Certificate::from_pem(pem).unwrap();
        certificate.inner.tbs_certificate.serial_number =
            x509_cert::serial_number::SerialNumber::new(&[0x07]).unwrap();
        assert!(certificate.verify_self_signature().is_err());
    }

    #[test]
    fn test_inspect_file_missing_path() {
        assert!(matches!(
            inspect_file("tests/testdata/does-not-exist.pem"),
            Err(CryptoError::IoError(_))
        ));
    }
}
