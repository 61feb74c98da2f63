//! Symmetric encryption of cookie payloads.
//!
//! Values are sealed with AES-256-GCM under a fresh random nonce and encoded
//! as URL-safe base64 (`nonce || ciphertext || tag`), which is safe to place
//! in a cookie without further escaping.

use crate::error::{DecryptionError, EncryptionError, KeyError};
use aes_gcm::aead::{Aead, KeyInit, OsRng, rand_core::RngCore};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Accepts keys written with or without `=` padding.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encrypts and decrypts opaque string payloads for storage in cookies.
///
/// The key is fixed for the lifetime of the codec; there is no rotation.
#[derive(Clone)]
pub struct CookieCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec").finish_non_exhaustive()
    }
}

impl CookieCodec {
    /// Creates a codec from raw key bytes.
    #[must_use]
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new((&key).into()),
        }
    }

    /// Creates a codec from a URL-safe base64 key of 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not base64 or has the wrong length.
    pub fn from_base64_key(encoded: &str) -> Result<Self, KeyError> {
        let bytes = KEY_ENGINE
            .decode(encoded.trim())
            .map_err(|_| KeyError::InvalidEncoding)?;
        let key: [u8; KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidLength { len: bytes.len() })?;
        Ok(Self::new(key))
    }

    /// Encrypts a plaintext. Two calls with the same input yield different
    /// ciphertexts.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher refuses the payload.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| EncryptionError)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    /// Decrypts a value produced by [`encrypt`](Self::encrypt).
    ///
    /// An absent or empty value is not an error: it means there is no session.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionError` if the value is malformed, was produced under
    /// another key, or was modified.
    pub fn decrypt(&self, ciphertext: Option<&str>) -> Result<Option<String>, DecryptionError> {
        let Some(encoded) = ciphertext.filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| DecryptionError)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptionError);
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| DecryptionError)?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| DecryptionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CookieCodec {
        CookieCodec::new([7u8; KEY_LEN])
    }

    #[test]
    fn round_trip_preserves_plaintext() {
        let codec = codec();
        for plaintext in ["", "a", "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiIxIn0.sig", "ümlaut ✓"] {
            let sealed = codec.encrypt(plaintext).expect("encrypt");
            let opened = codec.decrypt(Some(&sealed)).expect("decrypt");
            assert_eq!(opened.as_deref(), Some(plaintext));
        }
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let codec = codec();
        let a = codec.encrypt("token").expect("encrypt");
        let b = codec.encrypt("token").expect("encrypt");
        assert_ne!(a, b);
    }

    #[test]
    fn ciphertext_is_cookie_safe() {
        let sealed = codec().encrypt("some token value").expect("encrypt");
        assert!(
            sealed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(!sealed.contains("some token value"));
    }

    #[test]
    fn absent_or_empty_is_none() {
        let codec = codec();
        assert_eq!(codec.decrypt(None), Ok(None));
        assert_eq!(codec.decrypt(Some("")), Ok(None));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let codec = codec();
        let sealed = codec.encrypt("token").expect("encrypt");
        let mut bytes = URL_SAFE_NO_PAD.decode(&sealed).expect("decode");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert_eq!(codec.decrypt(Some(&tampered)), Err(DecryptionError));
    }

    #[test]
    fn garbage_fails() {
        let codec = codec();
        assert_eq!(codec.decrypt(Some("not base64!")), Err(DecryptionError));
        assert_eq!(codec.decrypt(Some("c2hvcnQ")), Err(DecryptionError));
    }

    #[test]
    fn other_key_cannot_decrypt() {
        let sealed = codec().encrypt("token").expect("encrypt");
        let other = CookieCodec::new([8u8; KEY_LEN]);
        assert_eq!(other.decrypt(Some(&sealed)), Err(DecryptionError));
    }

    #[test]
    fn key_accepts_padded_and_unpadded_base64() {
        // A Fernet-style key: 32 bytes, URL-safe, padded.
        let padded = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
        let unpadded = padded.trim_end_matches('=');

        let a = CookieCodec::from_base64_key(padded).expect("padded key");
        let b = CookieCodec::from_base64_key(unpadded).expect("unpadded key");

        let sealed = a.encrypt("token").expect("encrypt");
        assert_eq!(b.decrypt(Some(&sealed)), Ok(Some("token".to_string())));
    }

    #[test]
    fn key_rejects_wrong_length() {
        let err = CookieCodec::from_base64_key("AAECAwQFBgcICQoLDA0ODw").expect_err("short key");
        assert_eq!(err, KeyError::InvalidLength { len: 16 });
    }

    #[test]
    fn key_rejects_bad_encoding() {
        let err = CookieCodec::from_base64_key("not a key!").expect_err("bad key");
        assert_eq!(err, KeyError::InvalidEncoding);
    }
}
