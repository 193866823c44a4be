use codec::envelope::encode_binary_with;
use codec::stream::{decrypt_stream, decrypt_stream_sized, encrypt_stream, encrypt_stream_with};
use codec::{decode_binary, DEFAULT_CHUNK_SIZE, IV_LEN};
use rand::rngs::StdRng;
use rand::SeedableRng;

const KEY: &[u8; 32] = b"1234567890abcdef1234567890abcdef";

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(131) ^ (i >> 7)) as u8).collect()
}

fn stream_encrypt_seeded(data: &[u8], chunk_size: usize, seed: u64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    encrypt_stream_with(KEY, data, &mut out, chunk_size, &mut rng).unwrap();
    out
}

fn stream_decrypt(envelope: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut out = Vec::new();
    decrypt_stream(KEY, envelope, &mut out, chunk_size).unwrap();
    out
}

#[test]
fn streamed_envelope_matches_whole_buffer_envelope() {
    let data = sample(1000);
    let whole = encode_binary_with(KEY, &data, &mut StdRng::seed_from_u64(42)).unwrap();
    for chunk_size in [1usize, 3, 7, 15, 16, 17, 31, 64, 999, 1000, 1001, DEFAULT_CHUNK_SIZE] {
        assert_eq!(
            stream_encrypt_seeded(&data, chunk_size, 42),
            whole,
            "chunk size {chunk_size}"
        );
    }
}

#[test]
fn round_trip_across_lengths_and_mismatched_chunk_sizes() {
    let sizes = [1usize, 5, 16, 17, 4096];
    for len in [0usize, 1, 15, 16, 17, 33, 257] {
        let data = sample(len);
        for &c1 in &sizes {
            for &c2 in &sizes {
                let envelope = stream_encrypt_seeded(&data, c1, len as u64);
                assert_eq!(envelope.len(), IV_LEN + len);
                assert_eq!(stream_decrypt(&envelope, c2), data, "len {len} c1 {c1} c2 {c2}");
            }
        }
    }
}

#[test]
fn multi_chunk_default_size_round_trip() {
    // Two full default chunks plus a tail that is not block aligned.
    let data = sample(2 * DEFAULT_CHUNK_SIZE + 5);
    let mut envelope = Vec::new();
    let stats = encrypt_stream(KEY, &data[..], &mut envelope, DEFAULT_CHUNK_SIZE).unwrap();
    assert_eq!(stats.chunks, 3);
    assert_eq!(stats.bytes, data.len() as u64);
    assert_eq!(envelope.len(), IV_LEN + data.len());

    let mut plain = Vec::new();
    decrypt_stream_sized(KEY, &envelope[..], &mut plain, envelope.len() as u64, 65_537).unwrap();
    assert_eq!(plain, data);
}

#[test]
fn stream_and_whole_buffer_formats_interoperate() {
    let data = sample(300);
    let mut envelope = Vec::new();
    encrypt_stream(KEY, &data[..], &mut envelope, 13).unwrap();
    assert_eq!(decode_binary(KEY, &envelope).unwrap(), data);

    let whole = codec::encode_binary(KEY, &data).unwrap();
    assert_eq!(stream_decrypt(&whole, 11), data);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_chunk_sizes_round_trip(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            c1 in 1usize..300,
            c2 in 1usize..300,
        ) {
            let envelope = stream_encrypt_seeded(&data, c1, 7);
            prop_assert_eq!(envelope.len(), IV_LEN + data.len());
            prop_assert_eq!(stream_decrypt(&envelope, c2), data);
        }

        #[test]
        fn chunk_size_never_changes_output(
            data in proptest::collection::vec(any::<u8>(), 0..1024),
            c in 1usize..200,
            seed in any::<u64>(),
        ) {
            let whole = encode_binary_with(KEY, &data, &mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(stream_encrypt_seeded(&data, c, seed), whole);
        }
    }
}
