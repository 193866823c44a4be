//! Envelope layout constants and the report types emitted by the CLI.
//!
//! # Binary envelope
//!
//! ```text
//! +----------------+---------------------------+
//! | IV (16 bytes)  | ciphertext (len(plaintext)) |
//! +----------------+---------------------------+
//!   nonce = IV[0..8], counter0 = big-endian u64 of IV[8..16]
//! ```
//!
//! The text envelope is the standard (padded) base64 encoding of the binary
//! envelope. There is no header, no trailer and no authentication tag.

use serde::{Deserialize, Serialize};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the initialization vector prepended to every envelope.
pub const IV_LEN: usize = 16;

/// Byte length of the nonce half of the IV.
pub const NONCE_LEN: usize = 8;

/// AES block size; the keystream advances one counter per block.
pub const BLOCK_LEN: usize = 16;

/// Default read size for the streaming path (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// CLI reports
// ---------------------------------------------------------------------------

/// Which transform a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Result of a file encrypt/decrypt, printed as JSON on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub operation: Operation,
    /// Source path as given by the caller.
    pub input: String,
    /// Destination path as given by the caller.
    pub output: String,
    /// Payload bytes transformed (IV excluded).
    pub bytes: u64,
    /// Number of chunks processed; `1` for the whole-buffer path.
    pub chunks: u64,
}

/// Result of a text encrypt/decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReport {
    pub operation: Operation,
    /// Base64 envelope for `encrypt`, recovered plaintext for `decrypt`.
    pub text: String,
}

/// Standard error body printed on any failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"truncated_envelope"`).
    pub code: String,
    /// Human-readable description. Never contains key material.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::CodecError> for ErrorResponse {
    fn from(e: &crate::CodecError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}
