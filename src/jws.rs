//! Signed request envelopes.
//!
//! An envelope carries the signer's public key as a JWK, the signature
//! algorithm, a nonce and an RSASSA-PKCS1-v1_5 SHA-256 signature over
//! `nonce || message`. Its wire form is
//!
//! ```json
//! {"nonce": "...", "alg": "RS256", "jwk": {"kty": "RSA", "e": "...", "n": "..."}, "sig": "..."}
//! ```
//!
//! with every binary value base64url encoded without padding.

use rand::RngCore;
use serde::Serialize;

use crate::error::Result;
use crate::key::{PrivateKey, PublicKey, SignatureAlgorithm};
use crate::pem_utils::{b64_decode, b64url_encode};

/// Length of the random nonce generated when the caller does not supply one.
pub const NONCE_LEN: usize = 16;

/// The "kty" (key type) parameter of a [`Jwk`].
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum JwkKeyType {
    #[serde(rename = "RSA")]
    Rsa,
}

/// [`Jwk`] or JSON Web Key as defined in [`rfc7517`], public RSA parameters only.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Jwk {
    pub kty: JwkKeyType,
    /// Public exponent, base64url without padding.
    pub e: String,
    /// Modulus, base64url without padding.
    pub n: String,
}

impl Jwk {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self {
            kty: JwkKeyType::Rsa,
            e: b64url_encode(public_key.exponent()),
            n: b64url_encode(public_key.modulus()),
        }
    }

    /// Rebuilds the RSA public key described by this JWK.
    pub fn to_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_components(&b64_decode(&self.n)?, &b64_decode(&self.e)?)
    }
}

/// Header fields covered by the signer: algorithm and signing key.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ProtectedHeader {
    pub alg: SignatureAlgorithm,
    pub jwk: Jwk,
}

/// A signed request envelope.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SignatureEnvelope {
    /// base64url of the raw nonce bytes.
    pub nonce: String,
    #[serde(flatten)]
    pub header: ProtectedHeader,
    /// base64url of the signature over `nonce || message`.
    pub sig: String,
}

impl SignatureEnvelope {
    /// Serializes to the JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks `sig` against `message` using the embedded JWK.
    pub fn verify(&self, message: &[u8]) -> Result<()> {
        let public_key = self.header.jwk.to_public_key()?;
        let mut signed = b64_decode(&self.nonce)?;
        signed.extend_from_slice(message);
        public_key.verify(&signed, &b64_decode(&self.sig)?)
    }
}

/// Signs `message` with `key` and wraps the result in a [`SignatureEnvelope`].
///
/// When `nonce` is `None` a fresh [`NONCE_LEN`] byte nonce is drawn from the
/// thread-local CSPRNG. Signing is deterministic, so a fixed nonce reproduces
/// the same signature.
pub fn sign(message: &[u8], key: &PrivateKey, nonce: Option<&[u8]>) -> Result<SignatureEnvelope> {
    let nonce = match nonce {
        Some(nonce) => nonce.to_vec(),
        None => {
            let mut nonce = vec![0u8; NONCE_LEN];
            rand::rng().fill_bytes(&mut nonce);
            tracing::trace!(len = NONCE_LEN, "generated envelope nonce");
            nonce
        }
    };

    let mut signed = Vec::with_capacity(nonce.len() + message.len());
    signed.extend_from_slice(&nonce);
    signed.extend_from_slice(message);
    let signature = key.sign(&signed)?;

    Ok(SignatureEnvelope {
        nonce: b64url_encode(&nonce),
        header: ProtectedHeader {
            alg: SignatureAlgorithm::Sha256WithRSA,
            jwk: Jwk::from_public_key(&key.public_key()),
        },
        sig: b64url_encode(signature),
    })
}
