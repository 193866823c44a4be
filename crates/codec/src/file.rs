//! File-level encrypt/decrypt on top of the envelope and stream layers.
//!
//! Output goes to a temporary file next to the destination and is renamed
//! into place only after the whole transform succeeded. A failed run leaves
//! no partial destination file; an existing destination is replaced only on
//! success. Missing parent directories of the destination are created.
//!
//! Outputs are created readable and writable by the owner only (mode `0600`
//! on Unix), whatever the umask, since a decrypted file is plaintext.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use common::protocol::{FileReport, Operation};
use common::{CodecError, CodecResult};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{envelope, key, stream};

/// Encrypt `input` into an envelope at `output` in a single pass.
///
/// The whole file is held in memory; use [`encrypt_file_chunked`] for large
/// inputs.
pub fn encrypt_file(key: &[u8], input: &Path, output: &Path) -> CodecResult<FileReport> {
    key::validate(key)?;
    let plaintext = read_input(input)?;
    let envelope = envelope::encode_binary(key, &plaintext)?;
    write_atomically(output, |file| Ok(file.write_all(&envelope)?))?;

    info!(input = %input.display(), output = %output.display(), bytes = plaintext.len(), "file encrypted");
    Ok(report(Operation::Encrypt, input, output, plaintext.len() as u64, 1))
}

/// Decrypt the envelope at `input` into `output` in a single pass.
pub fn decrypt_file(key: &[u8], input: &Path, output: &Path) -> CodecResult<FileReport> {
    key::validate(key)?;
    let envelope = read_input(input)?;
    let plaintext = envelope::decode_binary(key, &envelope)?;
    write_atomically(output, |file| Ok(file.write_all(&plaintext)?))?;

    info!(input = %input.display(), output = %output.display(), bytes = plaintext.len(), "file decrypted");
    Ok(report(Operation::Decrypt, input, output, plaintext.len() as u64, 1))
}

/// Encrypt `input` into `output`, reading at most `chunk_size` bytes at a time.
pub fn encrypt_file_chunked(
    key: &[u8],
    input: &Path,
    output: &Path,
    chunk_size: usize,
) -> CodecResult<FileReport> {
    key::validate(key)?;
    let source = open_input(input)?;
    let stats = write_atomically(output, |file| {
        stream::encrypt_stream(key, &source, file, chunk_size)
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        chunks = stats.chunks,
        bytes = stats.bytes,
        "file encrypted in chunks"
    );
    Ok(report(Operation::Encrypt, input, output, stats.bytes, stats.chunks))
}

/// Decrypt the envelope at `input` into `output`, chunk by chunk.
///
/// For a regular file the size is taken from its metadata, so reads stop
/// exactly at the end of the envelope. Pipes and devices report no useful
/// size and are read to end of input instead.
pub fn decrypt_file_chunked(
    key: &[u8],
    input: &Path,
    output: &Path,
    chunk_size: usize,
) -> CodecResult<FileReport> {
    key::validate(key)?;
    let source = open_input(input)?;
    let metadata = source.metadata()?;
    let stats = write_atomically(output, |file| {
        if metadata.is_file() {
            stream::decrypt_stream_sized(key, &source, file, metadata.len(), chunk_size)
        } else {
            debug!(input = %input.display(), "input is not a regular file, reading to end");
            stream::decrypt_stream(key, &source, file, chunk_size)
        }
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        chunks = stats.chunks,
        bytes = stats.bytes,
        "file decrypted in chunks"
    );
    Ok(report(Operation::Decrypt, input, output, stats.bytes, stats.chunks))
}

fn open_input(input: &Path) -> CodecResult<File> {
    File::open(input).map_err(|e| {
        debug!(input = %input.display(), error = %e, "cannot open input");
        CodecError::Io(e)
    })
}

fn read_input(input: &Path) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    open_input(input)?.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Run `write` against a temporary file in `output`'s directory and rename
/// it over `output` once `write` succeeded. On error the temporary file is
/// removed when it drops.
fn write_atomically<T, F>(output: &Path, write: F) -> CodecResult<T>
where
    F: FnOnce(&mut File) -> CodecResult<T>,
{
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        debug!(dir = %dir.display(), "created output directory");
    }

    let mut tmp = NamedTempFile::new_in(dir)?;
    let value = write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| CodecError::Io(e.error))?;
    Ok(value)
}

fn report(op: Operation, input: &Path, output: &Path, bytes: u64, chunks: u64) -> FileReport {
    FileReport {
        operation: op,
        input: input.display().to_string(),
        output: output.display().to_string(),
        bytes,
        chunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::protocol::{IV_LEN, KEY_LEN};
    use tempfile::tempdir;

    const KEY: &[u8; KEY_LEN] = b"1234567890abcdef1234567890abcdef";

    #[test]
    fn whole_file_round_trip() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        let enc = dir.path().join("plain.txt.enc");
        let dec = dir.path().join("plain.dec.txt");
        fs::write(&plain, b"file contents").unwrap();

        let r = encrypt_file(KEY, &plain, &enc).unwrap();
        assert_eq!((r.bytes, r.chunks), (13, 1));
        assert_eq!(fs::metadata(&enc).unwrap().len(), IV_LEN as u64 + 13);

        decrypt_file(KEY, &enc, &dec).unwrap();
        assert_eq!(fs::read(&dec).unwrap(), b"file contents");
    }

    #[test]
    fn creates_missing_output_directories() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("in.bin");
        let enc = dir.path().join("nested/deeper/in.bin.enc");
        fs::write(&plain, [1u8, 2, 3]).unwrap();

        encrypt_file_chunked(KEY, &plain, &enc, 2).unwrap();
        assert!(enc.exists());
    }

    #[test]
    fn missing_input_is_not_found_and_output_untouched() {
        let dir = tempdir().unwrap();
        let enc = dir.path().join("out.enc");
        let err = encrypt_file(KEY, &dir.path().join("absent"), &enc).unwrap_err();
        match err {
            CodecError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!enc.exists());
    }

    #[test]
    fn failed_decrypt_leaves_no_output() {
        let dir = tempdir().unwrap();
        let enc = dir.path().join("short.enc");
        let dec = dir.path().join("short.dec");
        fs::write(&enc, [0u8; 5]).unwrap();

        let err = decrypt_file_chunked(KEY, &enc, &dec, 4).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedEnvelope { actual: 5 }));
        assert!(!dec.exists());
        // Only the input remains; the temporary file was cleaned up.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn outputs_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let plain = dir.path().join("secret.txt");
        let enc = dir.path().join("secret.txt.enc");
        let dec = dir.path().join("secret.dec.txt");
        fs::write(&plain, b"secret").unwrap();

        encrypt_file_chunked(KEY, &plain, &enc, 4).unwrap();
        decrypt_file(KEY, &enc, &dec).unwrap();
        for path in [&enc, &dec] {
            let mode = fs::metadata(path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{}", path.display());
        }
    }

    #[cfg(unix)]
    #[test]
    fn chunked_decrypt_reads_pipes_to_end() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("data.bin");
        let enc = dir.path().join("data.bin.enc");
        let fifo = dir.path().join("pipe");
        let dec = dir.path().join("data.dec");
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 253) as u8).collect();
        fs::write(&plain, &data).unwrap();
        encrypt_file(KEY, &plain, &enc).unwrap();

        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());
        let envelope = fs::read(&enc).unwrap();
        let writer = {
            let fifo = fifo.clone();
            std::thread::spawn(move || fs::write(fifo, envelope).unwrap())
        };

        let r = decrypt_file_chunked(KEY, &fifo, &dec, 1024).unwrap();
        writer.join().unwrap();
        assert_eq!(r.bytes, 5000);
        assert_eq!(fs::read(&dec).unwrap(), data);
    }

    #[test]
    fn invalid_key_rejected_before_reading_input() {
        let dir = tempdir().unwrap();
        let err = encrypt_file(b"too short", &dir.path().join("absent"), &dir.path().join("o"))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidKeyLength { actual: 9 }));
    }
}
