//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "AES-256-CTR envelope encryption for files and text")]
pub struct Args {
    /// Read the 32 raw key bytes from this file (overrides CTR_ENVELOPE_KEY).
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Chunk size in bytes for streamed file operations (overrides CTR_ENVELOPE_CHUNK_SIZE).
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a file into an IV-prefixed envelope.
    EncryptFile {
        input: PathBuf,
        output: PathBuf,
        /// Read the whole file into memory and encrypt it in one pass.
        #[arg(long)]
        whole: bool,
    },
    /// Decrypt an IV-prefixed envelope file.
    DecryptFile {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        whole: bool,
    },
    /// Encrypt text and print the base64 envelope. Reads stdin when TEXT is omitted.
    EncryptText { text: Option<String> },
    /// Decrypt a base64 envelope and print the text. Reads stdin when omitted.
    DecryptText { envelope: Option<String> },
}
