use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use der::Decode;

use crate::error::{CryptoError, Result};

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// URL-safe decoder that accepts input with or without `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
///
/// Lines are wrapped at 64 characters and terminated with `\n`, the same layout
/// OpenSSL writes.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded document to DER‑encoded bytes, checking its label.
pub fn pem_to_der(pem: impl AsRef<[u8]>, labels: &[&str]) -> Result<Vec<u8>> {
    let pem = pem::parse(pem.as_ref())?;
    if !labels.contains(&pem.tag()) {
        return Err(CryptoError::DecodingError(format!(
            "unexpected PEM label `{}`",
            pem.tag()
        )));
    }
    Ok(pem.into_contents())
}

/// base64url without padding, as used throughout JWS.
pub fn b64url_encode(data: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(data)
}

/// Decodes base64 in either the standard or URL-safe alphabet, padded or not.
///
/// ASCII whitespace is ignored so line wrapped input decodes as well.
pub fn b64_decode(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let normalized: Vec<u8> = data
        .as_ref()
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| match b {
            b'+' => b'-',
            b'/' => b'_',
            other => *other,
        })
        .collect();
    Ok(URL_SAFE_LENIENT.decode(normalized)?)
}

/// Turns the base64 (or base64url) DER of a certificate into its PEM form.
///
/// The decoded bytes must parse as an X.509 certificate; they are then written
/// out unchanged under a `CERTIFICATE` label.
pub fn wrap_der_as_pem(base64_der: impl AsRef<[u8]>) -> Result<String> {
    let der = b64_decode(base64_der)?;
    x509_cert::Certificate::from_der(&der)
        .map_err(|e| CryptoError::CertificateError(e.to_string()))?;
    Ok(der_to_pem(&der, CERTIFICATE_LABEL))
}
