//! Initialization vector generation and the fixed nonce/counter split.

use common::protocol::{IV_LEN, NONCE_LEN};
use common::{CodecError, CodecResult};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A 16-byte CTR initialization vector.
///
/// The first [`NONCE_LEN`] bytes are the nonce, held constant for the whole
/// stream. The last 8 bytes, read as a big-endian `u64`, are the counter
/// value of the first keystream block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Draw a fresh IV from the OS CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Draw a fresh IV from `rng`.
    pub fn generate_with<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; IV_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse the IV from the head of an envelope.
    ///
    /// Only the first [`IV_LEN`] bytes are read; anything after them is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TruncatedEnvelope`] if fewer than [`IV_LEN`]
    /// bytes are available.
    pub fn from_slice(bytes: &[u8]) -> CodecResult<Self> {
        let head = bytes
            .get(..IV_LEN)
            .ok_or(CodecError::TruncatedEnvelope {
                actual: bytes.len(),
            })?;
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(head);
        Ok(Self(iv))
    }

    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }

    /// Split into `(nonce, counter0)`.
    pub fn split(&self) -> ([u8; NONCE_LEN], u64) {
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&self.0[..NONCE_LEN]);
        let mut counter = [0u8; IV_LEN - NONCE_LEN];
        counter.copy_from_slice(&self.0[NONCE_LEN..]);
        (nonce, u64::from_be_bytes(counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_nonce_then_big_endian_counter() {
        let iv = Iv::from_bytes([
            0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, //
            0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff,
        ]);
        let (nonce, counter0) = iv.split();
        assert_eq!(nonce, [0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7]);
        assert_eq!(counter0, 0xf8f9_fafb_fcfd_feff);
    }

    #[test]
    fn split_small_counter() {
        let mut bytes = [0u8; IV_LEN];
        bytes[IV_LEN - 1] = 1;
        assert_eq!(Iv::from_bytes(bytes).split(), ([0u8; NONCE_LEN], 1));
    }

    #[test]
    fn generated_ivs_differ() {
        let a = Iv::generate();
        let b = Iv::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn from_slice_reads_only_the_head() {
        let mut envelope = vec![0x11u8; IV_LEN];
        envelope.extend_from_slice(b"ciphertext");
        let iv = Iv::from_slice(&envelope).unwrap();
        assert_eq!(iv.as_bytes(), &[0x11u8; IV_LEN]);
    }

    #[test]
    fn from_slice_rejects_short_input() {
        for len in [0usize, 1, 8, 15] {
            let err = Iv::from_slice(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, CodecError::TruncatedEnvelope { actual } if actual == len));
        }
    }
}
