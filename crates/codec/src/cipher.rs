//! AES-256 in counter mode with an explicit keystream cursor.
//!
//! Keystream block `i` of a stream is `AES-256(key, nonce || be64(counter0 + i))`.
//! Each output byte is the input byte XOR the matching keystream byte, so the
//! same transform both encrypts and decrypts.
//!
//! [`CtrCipher`] keeps the counter of the block it is consuming and the byte
//! offset inside that block. A call that stops mid-block leaves the offset
//! where it is, and the next call resumes from that exact byte. Splitting
//! one logical stream across many calls therefore yields the same bytes as a
//! single call over the whole buffer.
//!
//! **No integrity.** CTR output carries no tag; flipping a ciphertext bit
//! flips the same plaintext bit and a wrong key yields well-formed garbage.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes256, Block};
use common::protocol::{BLOCK_LEN, NONCE_LEN};
use zeroize::Zeroize;

use crate::iv::Iv;
use crate::key::Key;

/// Single-use AES-256-CTR keystream cursor.
///
/// One value drives one logical stream (one encrypt or decrypt call) and is
/// dropped with it. It is deliberately not `Clone`: two copies of the same
/// cursor would emit the same keystream twice.
pub struct CtrCipher {
    aes: Aes256,
    nonce: [u8; NONCE_LEN],
    /// Counter of the block the next keystream byte comes from.
    counter: u64,
    /// Bytes of the current block already consumed, `0..BLOCK_LEN`.
    offset: usize,
    /// Keystream for `counter`; only meaningful while `offset > 0`.
    keystream: Block,
    /// Total bytes transformed since construction.
    position: u64,
}

impl CtrCipher {
    pub fn new(key: &Key, nonce: [u8; NONCE_LEN], counter0: u64) -> Self {
        Self {
            aes: Aes256::new(key.as_bytes().into()),
            nonce,
            counter: counter0,
            offset: 0,
            keystream: Block::default(),
            position: 0,
        }
    }

    /// Build the cursor for a stream from its IV.
    pub fn from_iv(key: &Key, iv: &Iv) -> Self {
        let (nonce, counter0) = iv.split();
        Self::new(key, nonce, counter0)
    }

    /// XOR the keystream into `data` in place, advancing the cursor.
    pub fn apply(&mut self, data: &mut [u8]) {
        let len = data.len();
        let mut rest = data;
        while !rest.is_empty() {
            if self.offset == 0 {
                self.refill();
            }
            let take = (BLOCK_LEN - self.offset).min(rest.len());
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(take);
            let ks = &self.keystream[self.offset..self.offset + take];
            head.iter_mut().zip(ks).for_each(|(b, k)| *b ^= k);

            self.offset += take;
            if self.offset == BLOCK_LEN {
                self.offset = 0;
                self.counter = self.counter.wrapping_add(1);
            }
            rest = tail;
        }
        self.position += len as u64;
    }

    /// Transform `data` into a new buffer of the same length.
    pub fn transform(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply(&mut out);
        out
    }

    /// Counter of the block the next byte will be XORed with.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Offset of the next byte inside the current keystream block.
    pub fn block_offset(&self) -> usize {
        self.offset
    }

    /// Total bytes transformed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn refill(&mut self) {
        let mut block = Block::default();
        block[..NONCE_LEN].copy_from_slice(&self.nonce);
        block[NONCE_LEN..].copy_from_slice(&self.counter.to_be_bytes());
        self.aes.encrypt_block(&mut block);
        self.keystream = block;
    }
}

impl Drop for CtrCipher {
    fn drop(&mut self) {
        self.keystream.as_mut_slice().zeroize();
    }
}

impl std::fmt::Debug for CtrCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtrCipher")
            .field("counter", &self.counter)
            .field("offset", &self.offset)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
