//! Key validation and the [`Key`] buffer.
//!
//! Every public entry point of this crate runs [`validate`] (via
//! [`Key::from_slice`]) before it touches randomness, a cipher, or I/O.

use common::protocol::KEY_LEN;
use common::{CodecError, CodecResult};
use tracing::warn;
use zeroize::Zeroize;

/// Check that `key` is exactly [`KEY_LEN`] bytes.
///
/// # Errors
///
/// Returns [`CodecError::InvalidKeyLength`] for any other length.
pub fn validate(key: &[u8]) -> CodecResult<()> {
    if key.len() != KEY_LEN {
        // Length only; the key bytes never reach a log field.
        warn!(
            expected = KEY_LEN,
            actual = key.len(),
            "rejected key with invalid length"
        );
        return Err(CodecError::InvalidKeyLength { actual: key.len() });
    }
    Ok(())
}

/// Validated AES-256 key material.
///
/// Holds exactly [`KEY_LEN`] bytes. The buffer is zeroed on drop and never
/// printed by `Debug`.
#[derive(Clone)]
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Copy `bytes` into a new key after validating its length.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKeyLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> CodecResult<Self> {
        validate(bytes)?;
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Use the UTF-8 bytes of `text` as the key, with no hashing or KDF.
    ///
    /// A 32-character ASCII string therefore yields a valid key; anything
    /// whose UTF-8 encoding is not 32 bytes is rejected.
    pub fn from_text(text: &str) -> CodecResult<Self> {
        Self::from_slice(text.as_bytes())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        (*self.0).zeroize();
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_32_bytes() {
        assert!(validate(&[0u8; KEY_LEN]).is_ok());
        let key = Key::from_slice(&[7u8; KEY_LEN]).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn rejects_other_lengths() {
        for len in [0usize, 1, 16, 24, 31, 33, 64] {
            let err = validate(&vec![0u8; len]).unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidKeyLength { actual } if actual == len),
                "len {len}"
            );
        }
    }

    #[test]
    fn text_key_uses_utf8_bytes_directly() {
        let key = Key::from_text("1234567890abcdef1234567890abcdef").unwrap();
        assert_eq!(&key.as_bytes()[..], b"1234567890abcdef1234567890abcdef");
    }

    #[test]
    fn text_key_counts_bytes_not_chars() {
        // 11 chars of 3 bytes each = 33 bytes.
        assert!(Key::from_text("这是一段测试文本这是一").is_err());
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = Key::from_slice(&[0xAB; KEY_LEN]).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("171"));
    }
}
