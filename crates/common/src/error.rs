//! Common error types shared across crates.

use thiserror::Error;

use crate::protocol::{IV_LEN, KEY_LEN};

/// Top-level codec error type.
///
/// Variants map to process exit codes returned by the command-line tool:
/// - [`CodecError::InvalidKeyLength`] and [`CodecError::InvalidChunkSize`] → 2
/// - [`CodecError::TruncatedEnvelope`], [`CodecError::InvalidBase64`] → 3
/// - [`CodecError::InvalidUtf8`] → 4
/// - [`CodecError::Io`] → 5
#[derive(Debug, Error)]
pub enum CodecError {
    /// The key is not exactly [`KEY_LEN`] bytes. Detected before any I/O.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {actual}")]
    InvalidKeyLength { actual: usize },

    /// Fewer than [`IV_LEN`] bytes were available where an IV was expected.
    #[error("truncated envelope: expected at least {IV_LEN} bytes, got {actual}")]
    TruncatedEnvelope { actual: usize },

    /// The text envelope is not valid standard base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    /// The decrypted bytes are not valid UTF-8.
    ///
    /// CTR mode has no integrity check, so a wrong key or corrupted
    /// ciphertext decrypts to garbage instead of failing. On the text path
    /// this variant is how that garbage usually surfaces.
    #[error("decrypted text is not valid UTF-8 (valid up to byte {valid_up_to}); wrong key or corrupted ciphertext")]
    InvalidUtf8 { valid_up_to: usize },

    /// A chunk size of zero was requested.
    #[error("chunk size must be at least 1 byte")]
    InvalidChunkSize,

    /// Reading the source or writing the sink failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CodecError::InvalidKeyLength { .. } => 2,
            CodecError::InvalidChunkSize => 2,
            CodecError::TruncatedEnvelope { .. } => 3,
            CodecError::InvalidBase64(_) => 3,
            CodecError::InvalidUtf8 { .. } => 4,
            CodecError::Io(_) => 5,
        }
    }

    /// Short machine-readable error code (e.g. `"invalid_key_length"`).
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::InvalidKeyLength { .. } => "invalid_key_length",
            CodecError::TruncatedEnvelope { .. } => "truncated_envelope",
            CodecError::InvalidBase64(_) => "invalid_base64",
            CodecError::InvalidUtf8 { .. } => "invalid_utf8",
            CodecError::InvalidChunkSize => "invalid_chunk_size",
            CodecError::Io(_) => "io_error",
        }
    }
}

/// Convenience alias used throughout the codec crates.
pub type CodecResult<T> = Result<T, CodecError>;
