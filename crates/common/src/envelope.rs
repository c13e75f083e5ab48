//! The JSON envelope wrapped around every encrypted object.
//!
//! ```text
//! { "key_id": 12, "encryption_version": "1.0", "encrypted_payload": "<base64>" }
//! ```
//!
//! `encrypted_payload` is `base64(nonce(12) || ciphertext || tag(16))`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Envelope format version written by the current producer.
pub const ENCRYPTION_VERSION: &str = "1.0";

/// Identifier of a keystore secret.
///
/// Producers write ids as JSON numbers while older objects carry strings, so
/// both forms are accepted and normalised to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Signed(i64),
            Unsigned(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Signed(n) => KeyId(n.to_string()),
            Raw::Unsigned(n) => KeyId(n.to_string()),
            Raw::Text(s) => KeyId(s),
        })
    }
}

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Id of the keystore secret the payload was sealed with.
    pub key_id: KeyId,
    /// Base64 of `nonce || ciphertext || tag`.
    pub encrypted_payload: String,
    /// Producer format version, when present.
    pub encryption_version: Option<String>,
}

// Absent and `null` fields both surface as `MalformedInput` naming the field.
#[derive(Deserialize)]
struct RawEnvelope {
    key_id: Option<KeyId>,
    encrypted_payload: Option<String>,
    encryption_version: Option<String>,
}

impl Envelope {
    /// Parse an envelope from raw object bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedInput`] if the bytes are not a JSON
    /// object or if `key_id` / `encrypted_payload` are missing or null.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let raw: RawEnvelope = serde_json::from_slice(bytes).map_err(|e| {
            ValidationError::MalformedInput(format!("failed to parse envelope JSON: {e}"))
        })?;

        let key_id = raw
            .key_id
            .ok_or_else(|| ValidationError::MalformedInput("envelope is missing key_id".into()))?;
        let encrypted_payload = raw.encrypted_payload.ok_or_else(|| {
            ValidationError::MalformedInput("envelope is missing encrypted_payload".into())
        })?;

        Ok(Self {
            key_id,
            encrypted_payload,
            encryption_version: raw.encryption_version,
        })
    }

    /// Returns `true` unless the envelope declares a version other than [`ENCRYPTION_VERSION`].
    pub fn has_known_version(&self) -> bool {
        self.encryption_version
            .as_deref()
            .map_or(true, |v| v == ENCRYPTION_VERSION)
    }
}
