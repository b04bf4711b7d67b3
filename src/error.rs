//! use acme_crypto::error::CryptoError;

use thiserror::Error;

/// Represents errors that can occur in the acme-crypto library.
///
/// Only the producing and inspecting operations surface these. The validation
/// functions (`is_valid_*`, `csr_matches_private_key`) map every failure to `false`.
#[derive(Debug, Error, Clone)]
pub enum CryptoError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error related to certificate operations.
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from RSA PKCS1 operations.
    #[error("RSA PKCS1 error: {0}")]
    RsaPkcs1Error(String),

    /// Error while producing or checking a signature.
    #[error("Signature error: {0}")]
    SignatureError(String),

    /// Error while reading caller supplied data.
    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

impl From<der::Error> for CryptoError {
    /// Converts a `der::Error` into a `CryptoError`.
    fn from(err: der::Error) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CryptoError {
    fn from(err: rsa::Error) -> Self {
        CryptoError::RsaError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for CryptoError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        CryptoError::RsaPkcs1Error(err.to_string())
    }
}

impl From<pkcs8::Error> for CryptoError {
    fn from(err: pkcs8::Error) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for CryptoError {
    fn from(err: x509_cert::spki::Error) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CryptoError {
    fn from(err: pem::PemError) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<rsa::signature::Error> for CryptoError {
    fn from(err: rsa::signature::Error) -> Self {
        CryptoError::SignatureError(err.to_string())
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(err: serde_json::Error) -> Self {
        CryptoError::EncodingError(err.to_string())
    }
}
