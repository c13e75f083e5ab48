//! AES-256-GCM decryption of sealed payloads.
//!
//! The producer seals with a random 96-bit nonce and no associated data, and
//! concatenates the pieces as `nonce || ciphertext || tag`.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use common::ValidationError;
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Smallest valid sealed payload: a nonce and a tag around an empty ciphertext.
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The nonce is not [`NONCE_LEN`] bytes.
    #[error("invalid nonce length: expected {NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The key is not [`KEY_LEN`] bytes.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The tag is not [`TAG_LEN`] bytes.
    #[error("invalid tag length: expected {TAG_LEN} bytes, got {0}")]
    InvalidTagLength(usize),

    /// The sealed payload is shorter than [`MIN_SEALED_LEN`].
    #[error("sealed payload too short: expected at least {MIN_SEALED_LEN} bytes, got {0}")]
    Truncated(usize),

    /// The GCM tag did not verify.
    #[error("aead authentication failed")]
    AuthenticationFailure,

    /// Decryption succeeded but the plaintext is not UTF-8.
    #[error("plaintext is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

impl From<CipherError> for ValidationError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::InvalidNonceLength(n) => ValidationError::InvalidNonceLength(n),
            CipherError::InvalidKeyLength(_) => ValidationError::InvalidSecret(e.to_string()),
            CipherError::InvalidTagLength(_) | CipherError::Truncated(_) => {
                ValidationError::MalformedInput(e.to_string())
            }
            CipherError::AuthenticationFailure => ValidationError::AuthenticationFailure,
            CipherError::NotUtf8(_) => ValidationError::DecodeError(e.to_string()),
        }
    }
}

/// A sealed payload split into its three parts, borrowing from the decoded blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealedPayload<'a> {
    pub nonce: &'a [u8],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8],
}

impl<'a> SealedPayload<'a> {
    /// Split `nonce(12) || ciphertext || tag(16)`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Truncated`] if `blob` is shorter than [`MIN_SEALED_LEN`].
    pub fn split(blob: &'a [u8]) -> Result<Self, CipherError> {
        if blob.len() < MIN_SEALED_LEN {
            return Err(CipherError::Truncated(blob.len()));
        }
        let (nonce, rest) = blob.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);
        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

/// Decrypt and authenticate `ciphertext` with AES-256-GCM.
///
/// The nonce length is checked before anything else, so a bad nonce never
/// reaches the AEAD.
///
/// # Errors
///
/// Returns [`CipherError::InvalidNonceLength`], [`CipherError::InvalidKeyLength`]
/// or [`CipherError::InvalidTagLength`] on malformed inputs, and
/// [`CipherError::AuthenticationFailure`] if the tag does not verify.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if nonce.len() != NONCE_LEN {
        return Err(CipherError::InvalidNonceLength(nonce.len()));
    }
    let cipher = build_cipher(key)?;
    if tag.len() != TAG_LEN {
        return Err(CipherError::InvalidTagLength(tag.len()));
    }

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| CipherError::AuthenticationFailure)?;
    Ok(buffer)
}

/// Decrypt a [`SealedPayload`] and decode the plaintext as UTF-8.
///
/// # Errors
///
/// Everything [`decrypt`] returns, plus [`CipherError::NotUtf8`].
pub fn decrypt_text(key: &[u8], sealed: &SealedPayload<'_>) -> Result<String, CipherError> {
    let plaintext = decrypt(key, sealed.nonce, sealed.ciphertext, sealed.tag)?;
    Ok(String::from_utf8(plaintext)?)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}
