//! AES-256-GCM decryption primitives.
//!
//! This module is intentionally free of AWS and storage dependencies.
//!
//! # Sealed payload format
//!
//! ```text
//! base64( nonce(12) || ciphertext || tag(16) )
//! ```

pub mod cipher;

pub use cipher::{decrypt_text, SealedPayload, KEY_LEN};
