//! Configuration loading and validation for the `ctr-envelope` binary.
//!
//! Values are read from `CTR_ENVELOPE_*` environment variables at startup.
//! Command-line flags may override the chunk size and supply the key.

use anyhow::{Context, Result};
use codec::{CodecResult, Key, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "CTR_ENVELOPE";

/// Validated tool configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Key as text; its UTF-8 bytes are the AES-256 key (`CTR_ENVELOPE_KEY`).
    #[serde(default)]
    pub key: Option<String>,

    /// Read size for the chunked file path, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("{ENV_PREFIX}_CHUNK_SIZE must be > 0");
        }
        Ok(())
    }

    /// Key from the environment, if one was configured.
    ///
    /// The length is checked here rather than at load time, so a bad
    /// `CTR_ENVELOPE_KEY` only matters when no `--key-file` replaces it.
    pub fn key(&self) -> CodecResult<Option<Key>> {
        self.key.as_deref().map(Key::from_text).transpose()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("chunk_size", &self.chunk_size)
            .field("log_level", &self.log_level)
            .finish()
    }
}
