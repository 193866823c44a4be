//! AES-256-CTR envelope codec.
//!
//! This crate is free of configuration and process-level concerns. It
//! provides the transforms used by the `ctr-envelope` binary:
//!
//! - [`key`]: 32-byte key validation.
//! - [`iv`]: random IV generation and the nonce / counter split.
//! - [`cipher`]: the CTR keystream cursor.
//! - [`envelope`]: whole-buffer binary and base64 text envelopes.
//! - [`stream`]: chunked encrypt/decrypt over `Read` / `Write`.
//! - [`file`]: file helpers with write-to-temp-then-rename output.
//!
//! # Envelope format
//!
//! ```text
//! IV (16 bytes) || ciphertext (same length as the plaintext)
//! ```
//!
//! The format is unauthenticated. Decrypting with the wrong key or after
//! tampering does not fail on the binary path; it returns wrong bytes of
//! the right length.
//!
//! # IV reuse
//!
//! Every encryption draws a fresh IV from the OS CSPRNG. Nothing here tracks
//! IVs across calls; detecting reuse under one key belongs to whatever layer
//! manages keys.

pub mod cipher;
pub mod envelope;
pub mod file;
pub mod iv;
pub mod key;
pub mod stream;

pub use cipher::CtrCipher;
pub use common::protocol::{DEFAULT_CHUNK_SIZE, IV_LEN, KEY_LEN};
pub use common::{CodecError, CodecResult};
pub use envelope::{decode_binary, decode_text, encode_binary, encode_text};
pub use iv::Iv;
pub use key::Key;
pub use stream::{decrypt_stream, decrypt_stream_sized, encrypt_stream, StreamStats};
