//! Certificate signing requests.
//!
//! [`is_valid_csr`] and [`csr_matches_private_key`] are safe to call on
//! untrusted input and never return an error. [`make_csr`] produces a request
//! for a key and a list of domains.

use const_oid::ObjectIdentifier;
use der::asn1::{Any, BitString, SetOfVec};
use der::{Decode, Encode};
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::request::{CertReq, CertReqInfo, Version};

use crate::cert::extensions::{SubjectAltName, ToAndFromX509Extension};
use crate::cert::params::{ExtensionParam, SubjectTemplate};
use crate::error::{CryptoError, Result};
use crate::key::{PrivateKey, PublicKey, SignatureAlgorithm};
use crate::pem_utils;

pub const CSR_LABEL: &str = "CERTIFICATE REQUEST";
const LEGACY_CSR_LABEL: &str = "NEW CERTIFICATE REQUEST";

/// PKCS#9 extensionRequest attribute.
pub const EXTENSION_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");

/// A parsed PKCS#10 certificate signing request.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub inner: CertReq,
}

impl CertificateRequest {
    /// Parses a PEM encoded request. DER input is rejected.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, &[CSR_LABEL, LEGACY_CSR_LABEL])?;
        Self::from_der(&der)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertReq::from_der(der)?,
        })
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.inner.to_der()?, CSR_LABEL))
    }

    /// The public key embedded in the request.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.info.public_key)
    }

    /// Extensions carried in the extensionRequest attribute.
    pub fn requested_extensions(&self) -> Result<Vec<Extension>> {
        let mut extensions = Vec::new();
        for attribute in self.inner.info.attributes.iter() {
            if attribute.oid != EXTENSION_REQUEST {
                continue;
            }
            for value in attribute.values.iter() {
                extensions.extend(Vec::<Extension>::from_der(&value.to_der()?)?);
            }
        }
        Ok(extensions)
    }

    /// Requested subjectAltName DNS entries, empty when none were requested.
    pub fn dns_names(&self) -> Result<Vec<String>> {
        let extensions = self.requested_extensions()?;
        match extensions.iter().find(|ext| ext.extn_id == SubjectAltName::OID) {
            Some(ext) => Ok(ExtensionParam::from(ext)
                .to_extension::<SubjectAltName>()?
                .names),
            None => Ok(Vec::new()),
        }
    }
}

/// Returns `true` iff `csr` is a PEM encoded certificate request that parses.
///
/// DER input, empty input and arbitrary text all give `false`.
pub fn is_valid_csr(csr: impl AsRef<[u8]>) -> bool {
    match CertificateRequest::from_pem(csr) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(error = %err, "rejected certificate request");
            false
        }
    }
}

/// Returns `true` iff the public key in the PEM request `csr` equals the
/// public half of `key` (same modulus and exponent).
///
/// A request that does not parse gives `false`.
pub fn csr_matches_private_key(csr: impl AsRef<[u8]>, key: &PrivateKey) -> bool {
    match CertificateRequest::from_pem(csr).and_then(|request| request.public_key()) {
        Ok(public_key) => public_key == key.public_key(),
        Err(err) => {
            tracing::debug!(error = %err, "could not read public key from certificate request");
            false
        }
    }
}

/// Creates a PEM certificate request for `domains` signed by `key`, using the
/// default [`SubjectTemplate`].
///
/// The common name is `domains[0]` and every domain is requested as a
/// subjectAltName DNS entry.
pub fn make_csr(key: &PrivateKey, domains: &[impl AsRef<str>]) -> Result<String> {
    make_csr_with(key, domains, &SubjectTemplate::default())
}

/// [`make_csr`] with an explicit subject template.
pub fn make_csr_with(
    key: &PrivateKey,
    domains: &[impl AsRef<str>],
    subject: &SubjectTemplate,
) -> Result<String> {
    let names: Vec<String> = domains.iter().map(|d| d.as_ref().to_string()).collect();
    let Some(common_name) = names.first() else {
        return Err(CryptoError::InvalidInput(
            "at least one domain is required".to_string(),
        ));
    };

    let san = ExtensionParam::from_extension(
        SubjectAltName {
            names: names.clone(),
        },
        false,
    )?
    .to_x509_extension()?;
    let extension_request = Attribute {
        oid: EXTENSION_REQUEST,
        values: SetOfVec::try_from(vec![Any::from_der(&vec![san].to_der()?)?])?,
    };

    let info = CertReqInfo {
        version: Version::V1,
        subject: subject.with_common_name(common_name).as_x509_name()?,
        public_key: key.public_key().as_spki()?,
        attributes: SetOfVec::try_from(vec![extension_request])?,
    };

    let signature_algorithm = SignatureAlgorithm::Sha256WithRSA;
    let signature = key.sign(&info.to_der()?)?;
    let request = CertificateRequest {
        inner: CertReq {
            info,
            algorithm: signature_algorithm.into(),
            signature: BitString::from_bytes(&signature)?,
        },
    };

    tracing::debug!(
        common_name = %common_name,
        san_count = names.len(),
        "created certificate request"
    );
    request.to_pem()
}
