//! Common error types shared across crates.

use thiserror::Error;

/// Top-level validation error type.
///
/// Every failure is fatal for the invocation; the variants exist so that the
/// cause can be logged with a stable [`ValidationError::kind`] code:
/// - [`ValidationError::MalformedInput`] → `malformed_input`
/// - [`ValidationError::KeyNotFound`] → `key_not_found`
/// - [`ValidationError::InvalidNonceLength`] → `invalid_nonce_length`
/// - [`ValidationError::AuthenticationFailure`] → `authentication_failure`
/// - [`ValidationError::DecodeError`] → `decode_error`
/// - [`ValidationError::Storage`] → `storage_error`
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An envelope, keystore, or ciphertext blob could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The envelope names a key id that the keystore does not contain.
    #[error("key not found in keystore: {0}")]
    KeyNotFound(String),

    /// The nonce is not exactly 12 bytes.
    #[error("invalid nonce length: expected 12 bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The GCM tag did not verify: the data was tampered with or the key is wrong.
    #[error("authentication failure: GCM tag did not verify")]
    AuthenticationFailure,

    /// Bytes that must be UTF-8 text are not.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// The keystore secret is not base64 of a 256-bit key.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    /// A command-line argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Any object-store access failure: missing object, permission denied, network.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ValidationError {
    /// Returns the stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MalformedInput(_) => "malformed_input",
            ValidationError::KeyNotFound(_) => "key_not_found",
            ValidationError::InvalidNonceLength(_) => "invalid_nonce_length",
            ValidationError::AuthenticationFailure => "authentication_failure",
            ValidationError::DecodeError(_) => "decode_error",
            ValidationError::InvalidSecret(_) => "invalid_secret",
            ValidationError::InvalidArgument(_) => "invalid_argument",
            ValidationError::Storage(_) => "storage_error",
        }
    }
}
