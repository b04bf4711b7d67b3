//! # acme-crypto - Cryptographic Utilities for ACME Clients
//!
//! A pure Rust toolkit built on the RustCrypto libraries that covers the key,
//! certificate and request handling an ACME client needs:
//!
//! - **Keys**: RSA private key generation and validation in PKCS#1 PEM
//! - **Signed requests**: JWS-style envelopes with an embedded JWK and nonce
//! - **Certificate requests**: PKCS#10 validation, key matching and creation
//! - **Certificates**: inspection of X.509 metadata and self-signed issuance
//! - **Encoding**: base64url helpers and DER to PEM wrapping
//!
//! The `is_valid_*` and `csr_matches_private_key` helpers are meant for
//! untrusted input and answer with a plain `bool`. Everything that produces a
//! value returns [`error::Result`].
//!
//! ## Quick Start
//!
//! ### Signing a Request
//!
//! ```rust,no_run
//! use acme_crypto::{jws, key::{self, PrivateKey}};
//!
//! # fn main() -> Result<(), acme_crypto::error::CryptoError> {
//! let pem = key::generate(2048)?;
//! let key = PrivateKey::from_pem(&pem)?;
//!
//! let envelope = jws::sign(br#"{"resource":"new-reg"}"#, &key, None)?;
//! println!("{}", envelope.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Requests and Self-Signed Certificates
//!
//! ```rust,no_run
//! use acme_crypto::{cert, csr, key::PrivateKey};
//!
//! # fn main() -> Result<(), acme_crypto::error::CryptoError> {
//! let key = PrivateKey::generate(2048)?;
//! let domains = ["example.com", "www.example.com"];
//!
//! let request = csr::make_csr(&key, &domains)?;
//! assert!(csr::is_valid_csr(&request));
//! assert!(csr::csr_matches_private_key(&request, &key));
//!
//! let certificate = cert::make_self_signed(&key, &domains)?;
//! let info = cert::inspect(&certificate)?;
//! println!("{} ({}) valid until {}", info.subject, info.san, info.not_after);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use acme_crypto::{cert, error::CryptoError};
//!
//! match cert::inspect("not a certificate") {
//!     Ok(info) => println!("fingerprint {}", info.fingerprint),
//!     Err(CryptoError::DecodingError(msg)) => println!("Failed to decode: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: RSA private keys, public keys and key descriptors
//! - [`jws`]: Signed request envelopes and JWK serialization
//! - [`csr`]: Certificate signing request validation and creation
//! - [`cert`]: Certificate parsing, inspection and self-signed issuance
//! - [`issuer`]: Certificate issuing
//! - [`pem_utils`]: PEM and base64 helpers
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure

pub mod cert;
pub mod csr;
pub mod error;
pub mod issuer;
pub mod jws;
pub mod key;
pub mod pem_utils;
pub mod tbs_certificate;
