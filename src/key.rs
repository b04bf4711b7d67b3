use std::fmt;

use der::Decode;
use der::asn1::{Any, AnyRef, ObjectIdentifier};
use rsa::{
    BigUint, RsaPrivateKey, RsaPublicKey,
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    pkcs8::{DecodePrivateKey, LineEnding},
    signature::{SignatureEncoding, Signer, Verifier},
    traits::PublicKeyParts,
};
use serde::Serialize;
use sha2::Sha256;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::error::{CryptoError, Result};

const PKCS1_PEM_LABEL: &str = "RSA PRIVATE KEY";
const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// Largest RSA modulus, in bits, accepted for private and public keys alike.
pub const MAX_RSA_BITS: usize = 16384;

/// Generates an RSA key of `bits` modulus size and returns it PKCS#1 PEM encoded.
pub fn generate(bits: usize) -> Result<String> {
    PrivateKey::generate(bits)?.to_pem()
}

/// Returns `true` only if `pem` holds a well formed RSA private key.
///
/// Empty input, non-PEM input and keys that fail the RSA consistency checks
/// all yield `false`.
pub fn is_valid_private_key(pem: impl AsRef<[u8]>) -> bool {
    match PrivateKey::from_pem(pem) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(error = %err, "rejected private key");
            false
        }
    }
}

/// Signature algorithms produced by this crate.
///
/// Serializes to its JWS `alg` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[serde(rename = "RS256")]
    Sha256WithRSA,
}

impl SignatureAlgorithm {
    /// The JWS algorithm name, e.g. `RS256`.
    pub fn jws_name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha256WithRSA => "RS256",
        }
    }
}

impl From<SignatureAlgorithm> for AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA PKCS#1 v1.5 identifiers carry an explicit NULL parameter.
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(Any::from(AnyRef::NULL)),
            },
        }
    }
}

/// An RSA private key.
///
/// Owned by whoever generated or loaded it. Nothing in this crate caches keys.
#[derive(Clone)]
pub struct PrivateKey {
    inner: Box<RsaPrivateKey>,
}

impl PrivateKey {
    /// Generate an RSA key with the specified number of bits.
    pub fn generate(bits: usize) -> Result<Self> {
        if bits > MAX_RSA_BITS {
            return Err(CryptoError::KeyGenerationError(format!(
                "{bits} bit modulus exceeds {MAX_RSA_BITS} bits"
            )));
        }
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
        tracing::debug!(bits, "generated RSA private key");
        Ok(Self {
            inner: Box::new(private),
        })
    }

    /// Parse a PEM encoded RSA key, either PKCS#1 (`RSA PRIVATE KEY`) or
    /// PKCS#8 (`PRIVATE KEY`).
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let pem = pem::parse(pem.as_ref())?;
        let private = match pem.tag() {
            PKCS1_PEM_LABEL => RsaPrivateKey::from_pkcs1_der(pem.contents())?,
            PKCS8_PEM_LABEL => RsaPrivateKey::from_pkcs8_der(pem.contents())?,
            other => {
                return Err(CryptoError::InvalidInput(format!(
                    "unsupported private key PEM label `{other}`"
                )));
            }
        };
        private.validate()?;
        if private.n().bits() > MAX_RSA_BITS {
            return Err(CryptoError::InvalidInput(format!(
                "{} bit modulus exceeds {MAX_RSA_BITS} bits",
                private.n().bits()
            )));
        }
        Ok(Self {
            inner: Box::new(private),
        })
    }

    /// Encode as a PKCS#1 PEM document.
    pub fn to_pem(&self) -> Result<String> {
        let pem = self.inner.to_pkcs1_pem(LineEnding::LF)?;
        Ok(pem.as_str().to_owned())
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.n().bits()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(RsaPublicKey::from(&*self.inner))
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 over SHA-256.
    ///
    /// The scheme is deterministic: the same key and data give the same signature.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key = SigningKey::<Sha256>::new((*self.inner).clone());
        let signature = signing_key.try_sign(data)?;
        Ok(signature.to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// The public half of an RSA key.
///
/// Two public keys are equal when both modulus and exponent match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(pub RsaPublicKey);

impl PublicKey {
    /// Extracts an RSA public key from a `SubjectPublicKeyInfo`.
    ///
    /// Moduli up to [`MAX_RSA_BITS`] are accepted.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        if spki.algorithm.oid != const_oid::db::rfc5912::RSA_ENCRYPTION {
            return Err(CryptoError::DecodingError(format!(
                "expected an RSA key, found {}",
                spki.algorithm.oid
            )));
        }
        let bits = spki.subject_public_key.as_bytes().ok_or_else(|| {
            CryptoError::DecodingError("public key bit string is not octet aligned".to_string())
        })?;
        let key = rsa::pkcs1::RsaPublicKey::from_der(bits)?;
        Self::from_components(key.modulus.as_bytes(), key.public_exponent.as_bytes())
    }

    /// Builds a key from big-endian modulus and exponent bytes.
    pub fn from_components(modulus: &[u8], exponent: &[u8]) -> Result<Self> {
        let public = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(exponent),
            MAX_RSA_BITS,
        )?;
        Ok(Self(public))
    }

    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        Ok(SubjectPublicKeyInfoOwned::from_key(self.0.clone())?)
    }

    /// Big-endian modulus without leading zero bytes.
    pub fn modulus(&self) -> Vec<u8> {
        self.0.n().to_bytes_be()
    }

    /// Big-endian public exponent without leading zero bytes.
    pub fn exponent(&self) -> Vec<u8> {
        self.0.e().to_bytes_be()
    }

    pub fn descriptor(&self) -> PublicKeyDescriptor {
        PublicKeyDescriptor {
            algorithm: KeyAlgorithm::Rsa,
            bits: self.0.n().bits(),
        }
    }

    /// Checks an RSASSA-PKCS1-v1_5 SHA-256 signature over `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let verifying_key = VerifyingKey::<Sha256>::new(self.0.clone());
        let signature = Signature::try_from(signature)?;
        verifying_key.verify(data, &signature)?;
        Ok(())
    }
}

/// Key algorithm families recognised when describing a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ec,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ec => "EC",
            KeyAlgorithm::Ed25519 => "ED25519",
        };
        f.write_str(name)
    }
}

/// Algorithm name plus key size, rendered as e.g. `RSA 512`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyDescriptor {
    pub algorithm: KeyAlgorithm,
    pub bits: usize,
}

impl PublicKeyDescriptor {
    /// Describes the key held in a `SubjectPublicKeyInfo`.
    ///
    /// RSA keys report their modulus size, EC keys the size of their named
    /// curve. Any other algorithm is a decoding error.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        match spki.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                Ok(PublicKey::from_x509spki(spki)?.descriptor())
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .ok_or_else(|| {
                        CryptoError::DecodingError("EC key without named curve".to_string())
                    })?
                    .decode_as::<ObjectIdentifier>()?;
                let bits = match curve {
                    const_oid::db::rfc5912::SECP_256_R_1 => 256,
                    const_oid::db::rfc5912::SECP_384_R_1 => 384,
                    const_oid::db::rfc5912::SECP_521_R_1 => 521,
                    other => {
                        return Err(CryptoError::DecodingError(format!(
                            "unsupported EC curve {other}"
                        )));
                    }
                };
                Ok(Self {
                    algorithm: KeyAlgorithm::Ec,
                    bits,
                })
            }
            const_oid::db::rfc8410::ID_ED_25519 => Ok(Self {
                algorithm: KeyAlgorithm::Ed25519,
                bits: 256,
            }),
            other => Err(CryptoError::DecodingError(format!(
                "unsupported public key algorithm {other}"
            ))),
        }
    }
}

impl fmt::Display for PublicKeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm, self.bits)
    }
}
