//! Keystore fetch and key-id resolution.
//!
//! # Lifecycle
//!
//! 1. [`resolve_secret`] fetches `<prefix><keystore object>` from the bucket.
//! 2. The document is parsed into a [`Keystore`] keyed by entry id.
//! 3. The requested id is looked up explicitly; an absent id is
//!    [`ValidationError::KeyNotFound`], never a default.
//! 4. The base64 secret is decoded into a [`SecretKey`].
//!
//! The keystore is fetched again for every comparison; nothing is cached.
//!
//! # Security invariants
//!
//! - Secrets are never logged or included in error messages.

pub mod secret;

pub use secret::SecretKey;

use std::collections::HashMap;

use common::keystore::parse_keystore;
use common::{KeyId, KeystoreEntry, ValidationError};
use tracing::{info, warn};

use crate::storage::ObjectStore;

/// Parsed keystore keyed by entry id.
#[derive(Debug, Default)]
pub struct Keystore {
    entries: HashMap<KeyId, KeystoreEntry>,
}

impl Keystore {
    /// Index `entries` by id. A repeated id keeps the later entry.
    pub fn from_entries(entries: Vec<KeystoreEntry>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let id = entry.id.clone();
            if map.insert(id.clone(), entry).is_some() {
                warn!(key_id = %id, "duplicate key id in keystore; later entry wins");
            }
        }
        Self { entries: map }
    }

    /// Parse a keystore document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedInput`] if the document does not parse.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        Ok(Self::from_entries(parse_keystore(bytes)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the entry registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::KeyNotFound`] if `id` is absent.
    pub fn entry(&self, id: &KeyId) -> Result<&KeystoreEntry, ValidationError> {
        self.entries
            .get(id)
            .ok_or_else(|| ValidationError::KeyNotFound(id.to_string()))
    }

    /// Decode the secret registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::KeyNotFound`] if `id` is absent and
    /// [`ValidationError::InvalidSecret`] if its secret is missing or does
    /// not decode.
    pub fn secret(&self, id: &KeyId) -> Result<SecretKey, ValidationError> {
        let encoded = self.entry(id)?.secret.as_deref().ok_or_else(|| {
            ValidationError::InvalidSecret(format!("keystore entry {id} has no secret"))
        })?;
        SecretKey::from_base64(encoded)
    }
}

/// Object key of the keystore document under `prefix`.
pub fn keystore_key(prefix: &str, keystore_object: &str) -> String {
    format!("{prefix}{keystore_object}")
}

/// Fetch the keystore and return the secret registered under `key_id`.
///
/// # Errors
///
/// Returns [`ValidationError::Storage`] if the keystore cannot be fetched,
/// [`ValidationError::MalformedInput`] if it does not parse, and
/// [`ValidationError::KeyNotFound`] / [`ValidationError::InvalidSecret`] from
/// the lookup.
pub async fn resolve_secret(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    keystore_object: &str,
    key_id: &KeyId,
) -> Result<SecretKey, ValidationError> {
    info!(key_id = %key_id, "fetching secret key");
    let key = keystore_key(prefix, keystore_object);
    let body = store.get(bucket, &key).await?;
    let keystore = Keystore::from_slice(&body)?;

    let entry = keystore.entry(key_id)?;
    info!(
        key_id = %key_id,
        site_id = ?entry.site_id,
        activates = ?entry.activates,
        keystore_size = keystore.len(),
        "resolved keystore entry"
    );
    keystore.secret(key_id)
}
