//! Whole-buffer envelopes: `IV || ciphertext`, and its base64 text form.
//!
//! # Envelope format
//!
//! ```text
//! binary: <16-byte IV><ciphertext, same length as plaintext>
//! text:   base64-standard-padded(binary)
//! ```
//!
//! A fresh IV is drawn for every encode call. Decoding reads the IV back from
//! the first 16 bytes, so each envelope is self-contained.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::IV_LEN;
use common::{CodecError, CodecResult};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::cipher::CtrCipher;
use crate::iv::Iv;
use crate::key::Key;

/// Encrypt `plaintext` into a binary envelope under a fresh random IV.
///
/// # Errors
///
/// Returns [`CodecError::InvalidKeyLength`] if `key` is not 32 bytes.
pub fn encode_binary(key: &[u8], plaintext: &[u8]) -> CodecResult<Vec<u8>> {
    encode_binary_with(key, plaintext, &mut OsRng)
}

/// As [`encode_binary`], drawing the IV from `rng`.
///
/// The key is validated before `rng` is touched.
pub fn encode_binary_with<R: RngCore + CryptoRng + ?Sized>(
    key: &[u8],
    plaintext: &[u8],
    rng: &mut R,
) -> CodecResult<Vec<u8>> {
    let key = Key::from_slice(key)?;
    let iv = Iv::generate_with(rng);
    let mut cipher = CtrCipher::from_iv(&key, &iv);

    let mut envelope = Vec::with_capacity(IV_LEN + plaintext.len());
    envelope.extend_from_slice(iv.as_bytes());
    envelope.extend_from_slice(plaintext);
    cipher.apply(&mut envelope[IV_LEN..]);

    debug!(bytes = plaintext.len(), "encoded binary envelope");
    Ok(envelope)
}

/// Decrypt a binary envelope back to plaintext bytes.
///
/// A wrong key is not detected here: the result has the right length but
/// meaningless content.
///
/// # Errors
///
/// Returns [`CodecError::InvalidKeyLength`] if `key` is not 32 bytes, or
/// [`CodecError::TruncatedEnvelope`] if `envelope` is shorter than the IV.
pub fn decode_binary(key: &[u8], envelope: &[u8]) -> CodecResult<Vec<u8>> {
    let key = Key::from_slice(key)?;
    let iv = Iv::from_slice(envelope)?;
    let plaintext = CtrCipher::from_iv(&key, &iv).transform(&envelope[IV_LEN..]);

    debug!(bytes = plaintext.len(), "decoded binary envelope");
    Ok(plaintext)
}

/// Encrypt UTF-8 `text` and return the base64 text envelope.
pub fn encode_text(key: &[u8], text: &str) -> CodecResult<String> {
    let envelope = encode_binary(key, text.as_bytes())?;
    Ok(STANDARD.encode(envelope))
}

/// Decode a base64 text envelope back to the original text.
///
/// # Errors
///
/// - [`CodecError::InvalidKeyLength`] if `key` is not 32 bytes.
/// - [`CodecError::InvalidBase64`] if `b64` is not standard padded base64.
/// - [`CodecError::TruncatedEnvelope`] if the decoded bytes are shorter than the IV.
/// - [`CodecError::InvalidUtf8`] if the decrypted bytes are not UTF-8, which
///   is what a wrong key or corrupted ciphertext almost always produces.
pub fn decode_text(key: &[u8], b64: &str) -> CodecResult<String> {
    crate::key::validate(key)?;
    let envelope = STANDARD
        .decode(b64.trim())
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
    let plaintext = decode_binary(key, &envelope)?;
    String::from_utf8(plaintext).map_err(|e| CodecError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}
