//! Chunked streaming over blocking byte sources and sinks.
//!
//! The source is read in chunks of at most `chunk_size` bytes, each chunk is
//! run through one [`CtrCipher`] and written out before the next read (in
//! pieces of at most 1 MiB when `chunk_size` is larger). The
//! cipher carries its counter and intra-block offset from chunk to chunk, so
//! the bytes written never depend on `chunk_size`.
//!
//! On failure part of the output may already be in the sink. Nothing here
//! rolls it back; see [`crate::file`] for the write-to-temp-then-rename
//! wrapper used for files.

use std::io::{self, Read, Write};

use common::protocol::{DEFAULT_CHUNK_SIZE, IV_LEN};
use common::{CodecError, CodecResult};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::cipher::CtrCipher;
use crate::iv::Iv;
use crate::key::Key;

/// Upper bound on the working buffer, whatever the chunk size.
const MAX_BUFFER: usize = DEFAULT_CHUNK_SIZE;

/// Counters reported by a completed stream operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Number of non-empty chunks read and transformed.
    pub chunks: u64,
    /// Payload bytes transformed, IV excluded.
    pub bytes: u64,
}

/// Encrypt everything `source` yields into an envelope written to `sink`.
///
/// The IV is written first, then each ciphertext chunk as soon as it is
/// produced.
///
/// # Errors
///
/// - [`CodecError::InvalidKeyLength`] / [`CodecError::InvalidChunkSize`]
///   before any randomness is drawn or any byte is read or written.
/// - [`CodecError::Io`] if reading `source` or writing `sink` fails.
pub fn encrypt_stream<R: Read, W: Write>(
    key: &[u8],
    source: R,
    sink: W,
    chunk_size: usize,
) -> CodecResult<StreamStats> {
    encrypt_stream_with(key, source, sink, chunk_size, &mut OsRng)
}

/// As [`encrypt_stream`], drawing the IV from `rng`.
pub fn encrypt_stream_with<R, W, G>(
    key: &[u8],
    mut source: R,
    mut sink: W,
    chunk_size: usize,
    rng: &mut G,
) -> CodecResult<StreamStats>
where
    R: Read,
    W: Write,
    G: RngCore + CryptoRng + ?Sized,
{
    let key = Key::from_slice(key)?;
    check_chunk_size(chunk_size)?;

    let iv = Iv::generate_with(rng);
    sink.write_all(iv.as_bytes())?;

    let mut cipher = CtrCipher::from_iv(&key, &iv);
    let stats = pump(&mut cipher, &mut source, &mut sink, chunk_size, None)?;
    sink.flush()?;

    info!(chunks = stats.chunks, bytes = stats.bytes, chunk_size, "stream encrypted");
    Ok(stats)
}

/// Decrypt an envelope read from `source` until end of input.
///
/// # Errors
///
/// - [`CodecError::InvalidKeyLength`] / [`CodecError::InvalidChunkSize`]
///   before any I/O.
/// - [`CodecError::TruncatedEnvelope`] if `source` ends within the IV.
/// - [`CodecError::Io`] on read or write failure.
pub fn decrypt_stream<R: Read, W: Write>(
    key: &[u8],
    mut source: R,
    mut sink: W,
    chunk_size: usize,
) -> CodecResult<StreamStats> {
    let key = Key::from_slice(key)?;
    check_chunk_size(chunk_size)?;

    let iv = read_iv(&mut source)?;
    let mut cipher = CtrCipher::from_iv(&key, &iv);
    let stats = pump(&mut cipher, &mut source, &mut sink, chunk_size, None)?;
    sink.flush()?;

    info!(chunks = stats.chunks, bytes = stats.bytes, chunk_size, "stream decrypted");
    Ok(stats)
}

/// Decrypt an envelope of known total length `envelope_len`.
///
/// Every read is bounded by the ciphertext still expected, so no byte past
/// the envelope is consumed from `source`.
///
/// # Errors
///
/// As [`decrypt_stream`], plus [`CodecError::Io`] with
/// [`io::ErrorKind::UnexpectedEof`] if `source` ends before `envelope_len`
/// bytes were read.
pub fn decrypt_stream_sized<R: Read, W: Write>(
    key: &[u8],
    mut source: R,
    mut sink: W,
    envelope_len: u64,
    chunk_size: usize,
) -> CodecResult<StreamStats> {
    let key = Key::from_slice(key)?;
    check_chunk_size(chunk_size)?;

    let ciphertext_len = envelope_len
        .checked_sub(IV_LEN as u64)
        .ok_or(CodecError::TruncatedEnvelope {
            actual: envelope_len as usize,
        })?;

    let iv = read_iv(&mut source)?;
    let mut cipher = CtrCipher::from_iv(&key, &iv);
    let stats = pump(
        &mut cipher,
        &mut source,
        &mut sink,
        chunk_size,
        Some(ciphertext_len),
    )?;
    sink.flush()?;

    info!(chunks = stats.chunks, bytes = stats.bytes, chunk_size, "stream decrypted");
    Ok(stats)
}

fn check_chunk_size(chunk_size: usize) -> CodecResult<()> {
    if chunk_size == 0 {
        return Err(CodecError::InvalidChunkSize);
    }
    Ok(())
}

fn read_iv<R: Read>(source: &mut R) -> CodecResult<Iv> {
    let mut buf = [0u8; IV_LEN];
    let n = read_chunk(source, &mut buf)?;
    if n < IV_LEN {
        return Err(CodecError::TruncatedEnvelope { actual: n });
    }
    Ok(Iv::from_bytes(buf))
}

/// Read-transform-write loop shared by every direction.
///
/// A chunk is up to `chunk_size` bytes of input; it moves through a working
/// buffer of at most [`MAX_BUFFER`] bytes, so a huge `chunk_size` costs no
/// more memory than the default. With `limit` set, exactly that many payload
/// bytes are read; running out early is an `UnexpectedEof` error.
fn pump<R: Read, W: Write>(
    cipher: &mut CtrCipher,
    source: &mut R,
    sink: &mut W,
    chunk_size: usize,
    limit: Option<u64>,
) -> CodecResult<StreamStats> {
    let mut capacity = chunk_size.min(MAX_BUFFER);
    if let Some(total) = limit {
        capacity = capacity.min(usize::try_from(total).unwrap_or(usize::MAX));
    }
    let mut buf = vec![0u8; capacity];
    let mut stats = StreamStats::default();

    let result = 'chunks: loop {
        let mut in_chunk = 0usize;
        // `true` once the source is exhausted or `limit` is reached.
        let done = loop {
            let mut want = capacity.min(chunk_size - in_chunk);
            if let Some(total) = limit {
                let left = total - stats.bytes;
                if left == 0 {
                    break true;
                }
                want = want.min(usize::try_from(left).unwrap_or(usize::MAX));
            }
            if want == 0 {
                break false;
            }

            let n = match read_chunk(source, &mut buf[..want]) {
                Ok(n) => n,
                Err(e) => break 'chunks Err(e),
            };
            if n > 0 {
                let piece = &mut buf[..n];
                cipher.apply(piece);
                if let Err(e) = sink.write_all(piece) {
                    break 'chunks Err(e);
                }
                in_chunk += n;
                stats.bytes += n as u64;
            }
            if n < want {
                break true;
            }
        };

        if in_chunk > 0 {
            stats.chunks += 1;
            debug!(chunk = stats.chunks, bytes = in_chunk, "processed chunk");
        }
        if !done {
            continue;
        }
        break match limit {
            Some(total) if stats.bytes < total => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("envelope ended after {} of {total} ciphertext bytes", stats.bytes),
            )),
            _ => Ok(()),
        };
    };

    buf.zeroize();
    result?;
    Ok(stats)
}

/// Fill `buf` from `source`, stopping early only at end of input.
///
/// Returns the number of bytes read; less than `buf.len()` means EOF.
fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
