//! Keystore document: the JSON array of cloud encryption keys.
//!
//! ```text
//! [
//!   {
//!     "id": 1, "siteId": 12, "activates": 1700000000, "created": 1700000000,
//!     "secret": "<base64>"
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::envelope::KeyId;
use crate::error::ValidationError;

/// A single keystore entry.
///
/// Only `id` and `secret` take part in validation; the producer's bookkeeping
/// fields are kept for log context. `secret` is only required on the entry
/// that is actually looked up. The secret text is wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreEntry {
    pub id: KeyId,
    /// Base64 of the 32-byte AES-256 key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(rename = "siteId", default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activates: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

impl Zeroize for KeystoreEntry {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

impl Drop for KeystoreEntry {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for KeystoreEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreEntry")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .field("site_id", &self.site_id)
            .field("activates", &self.activates)
            .field("created", &self.created)
            .finish()
    }
}

/// Parse the keystore document.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedInput`] if the bytes are not a JSON array
/// of entries each carrying an `id`.
pub fn parse_keystore(bytes: &[u8]) -> Result<Vec<KeystoreEntry>, ValidationError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ValidationError::MalformedInput(format!("failed to parse keystore JSON: {e}"))
    })
}
