mod util;

use acme_crypto::key::PrivateKey;
use acme_crypto::{cert, csr, jws, key, pem_utils};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Verifier;
use openssl::x509::{X509, X509Req};
use regex::Regex;
use std::fs;
use std::process::Command;

#[test]
fn test_openssl_validate_cert() {
    let key = util::rsa512_key();
    let cert_pem = cert::make_self_signed(&key, &["example.com", "www.example.com"]).unwrap();

    let cert_path = std::env::temp_dir().join(format!("acme_crypto_{}.pem", std::process::id()));
    fs::write(&cert_path, cert_pem).expect("Failed to write certificate");

    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&cert_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);

    assert!(
        output_text.contains("Version: 3 (0x2)"),
        "Version field is incorrect"
    );
    assert!(
        output_text.contains("Serial Number: 1337 (0x539)"),
        "Serial Number field is incorrect"
    );
    assert!(
        output_text.contains("Signature Algorithm: sha256WithRSAEncryption"),
        "Signature Algorithm field is incorrect"
    );
    assert!(
        output_text.contains("DNS:example.com, DNS:www.example.com"),
        "Subject Alternative Name is incorrect"
    );

    let subject_regex = Regex::new(r"Subject: .*CN\s?=\s?example\.com").unwrap();
    let issuer_regex = Regex::new(r"Issuer: .*O\s?=\s?University of Michigan and the EFF").unwrap();
    assert!(subject_regex.is_match(&output_text), "Subject field is incorrect");
    assert!(issuer_regex.is_match(&output_text), "Issuer field is incorrect");

    fs::remove_file(cert_path).expect("Failed to remove test certificate");
}

#[test]
fn test_openssl_crate_validate_cert() {
    let key = util::rsa512_key();
    let cert_pem = cert::make_self_signed(&key, &["example.com"]).unwrap();

    let x509 = X509::from_pem(cert_pem.as_bytes()).expect("Failed to parse PEM");

    let subject = x509
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(subject.to_string(), "example.com", "Subject CN mismatch");

    assert_eq!(x509.version(), 2, "X509 version should be 3 (0-based index)");

    let serial = x509.serial_number().to_bn().unwrap().to_dec_str().unwrap();
    assert_eq!(serial.to_string(), "1337", "Serial number should be 1337");

    let sig_alg = x509.signature_algorithm().object().nid();
    assert_eq!(sig_alg, openssl::nid::Nid::SHA256WITHRSAENCRYPTION);

    let public_key = x509.public_key().unwrap();
    assert!(x509.verify(&public_key).unwrap(), "Self signature does not verify");

    let fingerprint: String = x509
        .digest(MessageDigest::sha1())
        .unwrap()
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect();
    assert_eq!(cert::inspect(&cert_pem).unwrap().fingerprint, fingerprint);
}

#[test]
fn test_openssl_reads_generated_key() {
    let pem = key::generate(1024).unwrap();
    let pkey = PKey::private_key_from_pem(pem.as_bytes()).expect("Failed to parse key");
    assert_eq!(pkey.bits(), 1024);
    assert!(pkey.rsa().unwrap().check_key().unwrap());
}

#[test]
fn test_openssl_verifies_csr() {
    let key = PrivateKey::generate(1024).unwrap();
    let csr_pem = csr::make_csr(&key, &["example.com", "www.example.com"]).unwrap();

    let request = X509Req::from_pem(csr_pem.as_bytes()).expect("Failed to parse CSR");
    let public_key = request.public_key().unwrap();
    assert!(request.verify(&public_key).unwrap(), "CSR signature does not verify");

    let expected = PKey::private_key_from_pem(key.to_pem().unwrap().as_bytes()).unwrap();
    assert!(public_key.public_eq(&expected));

    let cn = request
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(cn.to_string(), "example.com");
}

#[test]
fn test_openssl_verifies_envelope() {
    let key = util::rsa512_key();
    let envelope = jws::sign(b"message", &key, None).unwrap();

    let pkey = PKey::private_key_from_pem(util::load("rsa512_key.pem").as_bytes()).unwrap();
    let mut verifier = Verifier::new(MessageDigest::sha256(), &pkey).unwrap();
    verifier
        .update(&pem_utils::b64_decode(&envelope.nonce).unwrap())
        .unwrap();
    verifier.update(b"message").unwrap();
    assert!(
        verifier
            .verify(&pem_utils::b64_decode(&envelope.sig).unwrap())
            .unwrap()
    );
}
