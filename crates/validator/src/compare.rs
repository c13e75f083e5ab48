//! Decrypt an encrypted salt object and compare it with its unencrypted twin.
//!
//! The encrypted object lives `path_depth` segments below the directory that
//! holds the unencrypted original, and keeps the original file name:
//!
//! ```text
//! salts/encrypted/12_private/salts.txt.1700000000  →  salts/salts.txt.1700000000
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{Envelope, ValidationError};
use tracing::{info, warn};

use crate::crypto::{decrypt_text, SealedPayload};
use crate::keystore;
use crate::storage::ObjectStore;

/// Layout settings used by [`Comparator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSettings {
    /// Keystore object key, relative to the prefix.
    pub keystore_object: String,
    /// Number of trailing key segments replaced by the file name.
    pub path_depth: usize,
}

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub encrypted_key: String,
    pub unencrypted_key: String,
    pub matches: bool,
}

/// Derive the unencrypted object key from an encrypted object key.
///
/// Drops the last `depth` segments to get the base path and appends the
/// final segment.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedInput`] if `key` has `depth` segments
/// or fewer, since no base path would remain.
pub fn unencrypted_key(key: &str, depth: usize) -> Result<String, ValidationError> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() <= depth {
        return Err(ValidationError::MalformedInput(format!(
            "key {key} has {} path segments; need more than {depth} to derive the unencrypted key",
            segments.len()
        )));
    }
    let base = segments[..segments.len() - depth].join("/");
    let file_name = segments[segments.len() - 1];
    Ok(format!("{base}/{file_name}"))
}

/// Decode an envelope and decrypt its payload to text.
///
/// # Errors
///
/// [`ValidationError::MalformedInput`] for a bad envelope or payload, plus
/// anything from keystore resolution and decryption.
pub async fn decrypt_envelope(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    keystore_object: &str,
    envelope_bytes: &[u8],
) -> Result<String, ValidationError> {
    let envelope = Envelope::from_slice(envelope_bytes)?;
    if !envelope.has_known_version() {
        warn!(
            version = envelope.encryption_version.as_deref().unwrap_or_default(),
            "unknown envelope version; attempting decryption anyway"
        );
    }

    let secret =
        keystore::resolve_secret(store, bucket, prefix, keystore_object, &envelope.key_id).await?;

    let blob = STANDARD.decode(envelope.encrypted_payload.trim()).map_err(|e| {
        ValidationError::MalformedInput(format!("encrypted_payload is not base64: {e}"))
    })?;
    let sealed = SealedPayload::split(&blob)?;

    Ok(decrypt_text(secret.as_bytes(), &sealed)?)
}

/// Compares encrypted objects under one bucket and prefix.
pub struct Comparator<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
    prefix: &'a str,
    settings: &'a CompareSettings,
}

impl<'a> Comparator<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        bucket: &'a str,
        prefix: &'a str,
        settings: &'a CompareSettings,
    ) -> Self {
        Self {
            store,
            bucket,
            prefix,
            settings,
        }
    }

    /// Compare the encrypted object at `<prefix><key>` with its unencrypted twin.
    ///
    /// Returns `matches == true` iff the decrypted text equals the unencrypted
    /// object's text exactly.
    ///
    /// # Errors
    ///
    /// Any [`ValidationError`] raised while fetching, decoding, or decrypting.
    /// A non-UTF-8 unencrypted object is [`ValidationError::DecodeError`].
    pub async fn compare(&self, key: &str) -> Result<Comparison, ValidationError> {
        let encrypted_key = format!("{}{key}", self.prefix);
        let unencrypted_key = unencrypted_key(&encrypted_key, self.settings.path_depth)?;
        info!(
            encrypted = %encrypted_key,
            unencrypted = %unencrypted_key,
            "comparing objects"
        );

        let envelope = self.store.get(self.bucket, &encrypted_key).await?;
        let decrypted = decrypt_envelope(
            self.store,
            self.bucket,
            self.prefix,
            &self.settings.keystore_object,
            &envelope,
        )
        .await?;

        let original = self.store.get(self.bucket, &unencrypted_key).await?;
        let original = std::str::from_utf8(&original).map_err(|e| {
            ValidationError::DecodeError(format!("{unencrypted_key} is not valid UTF-8: {e}"))
        })?;

        Ok(Comparison {
            matches: decrypted == original,
            encrypted_key,
            unencrypted_key,
        })
    }
}
