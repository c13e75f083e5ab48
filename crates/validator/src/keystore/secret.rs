//! [`SecretKey`]: decoded keystore secret, zeroed on drop.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::ValidationError;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::KEY_LEN;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
pub struct SecretKey(Box<[u8; KEY_LEN]>);

impl SecretKey {
    /// Decode a base64 keystore secret.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSecret`] if `encoded` is not standard
    /// base64 or does not decode to exactly [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, ValidationError> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| ValidationError::InvalidSecret(format!("secret is not base64: {e}")))?,
        );

        if decoded.len() != KEY_LEN {
            return Err(ValidationError::InvalidSecret(format!(
                "expected {KEY_LEN} bytes, got {}",
                decoded.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&decoded);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.0[..].zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("SecretKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_32_byte_secret() {
        let encoded = STANDARD.encode([0x42u8; KEY_LEN]);
        let key = SecretKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN][..]);
    }

    #[test]
    fn rejects_wrong_length() {
        let encoded = STANDARD.encode([0u8; 16]);
        let err = SecretKey::from_base64(&encoded).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSecret(ref m) if m.contains("got 16")));
    }

    #[test]
    fn rejects_non_base64() {
        let err = SecretKey::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSecret(_)));
    }

    #[test]
    fn redacted_in_debug() {
        let key = SecretKey::from_base64(&STANDARD.encode([0xffu8; KEY_LEN])).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }

    #[test]
    fn zeroize_clears_key_material() {
        let mut key = SecretKey::from_base64(&STANDARD.encode([0x42u8; KEY_LEN])).unwrap();
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN][..]);
    }
}
