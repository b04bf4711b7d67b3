use std::path::PathBuf;

use acme_crypto::key::PrivateKey;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

pub fn load_bytes(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).unwrap()
}

pub fn load(name: &str) -> String {
    String::from_utf8(load_bytes(name)).unwrap()
}

pub fn rsa512_key() -> PrivateKey {
    PrivateKey::from_pem(load("rsa512_key.pem")).unwrap()
}

#[allow(dead_code)]
pub fn rsa1024_key() -> PrivateKey {
    PrivateKey::from_pem(load("rsa1024_key.pem")).unwrap()
}
