//! Fixtures shared by unit tests across modules.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::envelope::ENCRYPTION_VERSION;
use serde_json::json;

use crate::crypto::cipher::{KEY_LEN, NONCE_LEN};

pub fn random_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    key
}

pub fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Seal with the reference encryptor, laid out as `nonce || ciphertext || tag`.
pub fn seal(plaintext: &[u8], key: &[u8], nonce: &[u8; NONCE_LEN]) -> Vec<u8> {
    let cipher = Aes256Gcm::new_from_slice(key).unwrap();
    let ciphertext_and_tag = cipher.encrypt(Nonce::from_slice(nonce), plaintext).unwrap();
    let mut blob = nonce.to_vec();
    blob.extend_from_slice(&ciphertext_and_tag);
    blob
}

/// Envelope JSON as the producer writes it.
pub fn envelope_json(key_id: serde_json::Value, plaintext: &str, key: &[u8]) -> Vec<u8> {
    versioned_envelope_json(key_id, Some(ENCRYPTION_VERSION), plaintext, key)
}

/// Envelope JSON with an explicit `encryption_version`, omitted when `None`.
pub fn versioned_envelope_json(
    key_id: serde_json::Value,
    version: Option<&str>,
    plaintext: &str,
    key: &[u8],
) -> Vec<u8> {
    let blob = seal(plaintext.as_bytes(), key, &random_nonce());
    let mut doc = json!({
        "key_id": key_id,
        "encrypted_payload": STANDARD.encode(blob),
    });
    if let Some(version) = version {
        doc["encryption_version"] = json!(version);
    }
    serde_json::to_vec_pretty(&doc).unwrap()
}

/// Keystore JSON holding one entry per `(id, key)` pair.
pub fn keystore_json(entries: &[(serde_json::Value, &[u8; KEY_LEN])]) -> Vec<u8> {
    let docs: Vec<_> = entries
        .iter()
        .map(|(id, key)| {
            json!({
                "id": id,
                "siteId": 1,
                "activates": 1_700_000_000,
                "created": 1_700_000_000,
                "secret": STANDARD.encode(key),
            })
        })
        .collect();
    serde_json::to_vec(&docs).unwrap()
}
