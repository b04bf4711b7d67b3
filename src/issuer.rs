use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::BasicConstraints;
use crate::cert::params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use crate::error::CryptoError;
use crate::key::{PrivateKey, SignatureAlgorithm};
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &PrivateKey;

    /// Issues a certificate based on the provided certification request information.
    ///
    /// A `basicConstraints` extension reflecting `cert_request.is_ca` is always
    /// written first, followed by the request's own extensions.
    ///
    /// # Arguments
    /// * `cert_request` - Subject, public key and extensions of the new certificate.
    /// * `serial_number` - Serial number to assign.
    /// * `validity` - Validity window.
    fn issue(
        &self,
        cert_request: &CertificationRequestInfo,
        serial_number: u64,
        validity: Validity,
    ) -> Result<Certificate, CryptoError> {
        let signature_algorithm = SignatureAlgorithm::Sha256WithRSA;

        let basic_constraints = BasicConstraints {
            is_ca: cert_request.is_ca,
            max_path_length: None,
        };

        let extensions = std::iter::once(ExtensionParam::from_extension(basic_constraints, false)?)
            .chain(cert_request.extensions.iter().cloned())
            .collect();

        let tbs_cert = TbsCertificate {
            serial_number,
            signature_algorithm,
            issuer: self.issuer_name(),
            validity,
            subject: cert_request.subject.clone(),
            subject_public_key: cert_request.subject_public_key.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algorithm.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}
