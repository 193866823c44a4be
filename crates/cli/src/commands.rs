//! Command dispatch: resolve the key, run the codec operation, render JSON.

use std::io::Read;

use anyhow::{Context, Result};
use codec::{envelope, file, Key};
use common::protocol::{Operation, TextReport};
use tracing::debug;
use zeroize::Zeroize;

use crate::cli::{Args, Command};
use crate::config::{Config, ENV_PREFIX};

/// Run the selected command and return its JSON report.
///
/// Codec failures are returned as [`common::CodecError`] inside the
/// `anyhow::Error` so the caller can map them to an exit code.
pub fn run(args: &Args, cfg: &Config) -> Result<String> {
    let key = resolve_key(args, cfg)?;
    let key = &key.as_bytes()[..];
    let chunk_size = args.chunk_size.unwrap_or(cfg.chunk_size);

    let json = match &args.command {
        Command::EncryptFile {
            input,
            output,
            whole,
        } => {
            let report = if *whole {
                file::encrypt_file(key, input, output)?
            } else {
                file::encrypt_file_chunked(key, input, output, chunk_size)?
            };
            serde_json::to_string(&report)?
        }
        Command::DecryptFile {
            input,
            output,
            whole,
        } => {
            let report = if *whole {
                file::decrypt_file(key, input, output)?
            } else {
                file::decrypt_file_chunked(key, input, output, chunk_size)?
            };
            serde_json::to_string(&report)?
        }
        Command::EncryptText { text } => {
            let text = text_or_stdin(text.as_deref())?;
            let report = TextReport {
                operation: Operation::Encrypt,
                text: envelope::encode_text(key, &text)?,
            };
            serde_json::to_string(&report)?
        }
        Command::DecryptText { envelope: b64 } => {
            let b64 = text_or_stdin(b64.as_deref())?;
            let report = TextReport {
                operation: Operation::Decrypt,
                text: envelope::decode_text(key, &b64)?,
            };
            serde_json::to_string(&report)?
        }
    };
    Ok(json)
}

/// `--key-file` wins over `CTR_ENVELOPE_KEY`; one of them is required.
fn resolve_key(args: &Args, cfg: &Config) -> Result<Key> {
    if let Some(path) = &args.key_file {
        let mut bytes = std::fs::read(path)
            .with_context(|| format!("failed to read key file '{}'", path.display()))?;
        let key = Key::from_slice(&bytes);
        bytes.zeroize();
        debug!(path = %path.display(), "key loaded from file");
        return Ok(key?);
    }
    cfg.key()?
        .with_context(|| format!("no key configured: set {ENV_PREFIX}_KEY or pass --key-file"))
}

fn text_or_stdin(arg: Option<&str>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text.to_owned());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(strip_line_ending(buf))
}

/// Drop one trailing `\n` or `\r\n`, as left by `echo` and most editors.
fn strip_line_ending(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}
