//! Property-based tests for the block codec, the preprocessing transforms and
//! the streaming encoder.
//!
//! Run with: cargo test -p comprexia-core --test properties

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use comprexia_core::block::{
    Block, BlockReader, MAX_DISTANCE, MAX_EXTENDED_MATCH, MAX_LITERAL_RUN, MAX_SHORT_MATCH,
    MIN_MATCH,
};
use comprexia_core::preprocess::{delta_decode, delta_encode, postprocess, preprocess};
use comprexia_core::{
    compress, compress_advanced, compress_fast, compress_json, compress_utf8, decompress,
    decompress_advanced, decompress_json, decompress_utf8, init, Error,
};

/// Bytes drawn from a small alphabet so matches are common.
fn repetitive_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), any::<u8>()], 0..2048)
}

/// Any bytes, weighted toward the continuation and token ranges.
fn awkward_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![0x80u8..0xC0, 0xF0u8..=0xFF, any::<u8>(), Just(b'"'), Just(b'\\')],
        0..512,
    )
}

/// Small JSON documents rendered with and without whitespace.
fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|n| serde_json::json!(n)),
        "[a-zA-Zé中🎉 \"\\\\]{0,12}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Split points for chunking a buffer.
fn chunk_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..300, 1..12)
}

fn assert_block_bounds(stream: &[u8]) {
    for block in BlockReader::new(stream) {
        match block.expect("encoder produced an unreadable block") {
            Block::Literal(bytes) => {
                assert!(!bytes.is_empty());
                assert!(bytes.len() <= MAX_LITERAL_RUN);
            }
            Block::Short { length, distance } => {
                assert!((MIN_MATCH..=MAX_SHORT_MATCH).contains(&length));
                assert!((1..=MAX_DISTANCE).contains(&distance));
            }
            Block::Extended { length, distance } => {
                assert!(length > MAX_SHORT_MATCH && length <= MAX_EXTENDED_MATCH);
                assert!((1..=MAX_DISTANCE).contains(&distance));
            }
        }
    }
}

fn stream_in_chunks(data: &[u8], sizes: &[usize]) -> Vec<u8> {
    let mut encoder = init();
    let mut out = Vec::new();
    let mut pos = 0;
    let mut sizes = sizes.iter().cycle();
    while pos < data.len() {
        let end = (pos + sizes.next().copied().unwrap_or(1)).min(data.len());
        out.extend(encoder.feed_chunk(&data[pos..end]).unwrap());
        pos = end;
    }
    out.extend(encoder.finish().unwrap());
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Property: the thorough and fast encoders both round-trip any buffer.
    #[test]
    fn prop_roundtrip(data in repetitive_bytes()) {
        prop_assert_eq!(decompress(&compress(&data)).unwrap(), data.clone());
        prop_assert_eq!(decompress(&compress_fast(&data)).unwrap(), data);
    }

    /// Property: every emitted block respects the field bounds.
    #[test]
    fn prop_block_bounds(data in repetitive_bytes()) {
        assert_block_bounds(&compress(&data));
        assert_block_bounds(&compress_fast(&data));
    }

    /// Property: the UTF-8 delta transform is a bijection on arbitrary bytes.
    #[test]
    fn prop_utf8_delta_inverse(data in awkward_bytes()) {
        prop_assert_eq!(delta_decode(&delta_encode(&data)), data.clone());
        prop_assert_eq!(decompress_utf8(&compress_utf8(&data)).unwrap(), data);
    }

    /// Property: tokenization only ever loses whitespace outside strings, so
    /// input without any whitespace comes back unchanged.
    #[test]
    fn prop_json_tokens_reversible(data in awkward_bytes()) {
        let data: Vec<u8> = data
            .into_iter()
            .filter(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .collect();
        prop_assert_eq!(postprocess(&preprocess(&data)).unwrap(), data.clone());
        prop_assert_eq!(decompress_json(&compress_json(&data)).unwrap(), data.clone());
        prop_assert_eq!(decompress_advanced(&compress_advanced(&data)).unwrap(), data);
    }

    /// Property: pretty and compact renderings tokenize identically and
    /// restore to the compact rendering.
    #[test]
    fn prop_json_whitespace_normalized(value in json_value()) {
        let compact = serde_json::to_vec(&value).unwrap();
        let pretty = serde_json::to_vec_pretty(&value).unwrap();
        prop_assert_eq!(preprocess(&pretty), preprocess(&compact));

        let restored = decompress_advanced(&compress_advanced(&pretty)).unwrap();
        prop_assert_eq!(&restored, &compact);
        let parsed: serde_json::Value = serde_json::from_slice(&restored).unwrap();
        prop_assert_eq!(parsed, value);
    }

    /// Property: how the input is chunked never shows after decoding.
    #[test]
    fn prop_chunking_invariance(data in repetitive_bytes(), sizes in chunk_sizes()) {
        let stream = stream_in_chunks(&data, &sizes);
        assert_block_bounds(&stream);
        prop_assert_eq!(decompress(&stream).unwrap(), data.clone());

        let whole = stream_in_chunks(&data, &[data.len().max(1)]);
        prop_assert_eq!(decompress(&whole).unwrap(), data);
    }

    /// Property: arbitrary bytes never panic the decoder.
    #[test]
    fn prop_decoder_total(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decompress(&data);
        let _ = decompress_json(&data);
        let _ = decompress_advanced(&data);
    }
}

#[test]
fn test_seeded_text_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let words = ["alpha", "beta", "gamma", "δέλτα", "эпсилон", "ζήτα", "η", "θ"];
    let mut text = String::new();
    for _ in 0..5000 {
        text.push_str(words[rng.gen_range(0..words.len())]);
        text.push(' ');
    }

    let data = text.as_bytes();
    for compressed in [compress(data), compress_fast(data), compress_utf8(data)] {
        assert!(compressed.len() < data.len());
    }
    assert_eq!(decompress(&compress(data)).unwrap(), data);
    assert_eq!(decompress_utf8(&compress_utf8(data)).unwrap(), data);
    assert_eq!(decompress(&stream_in_chunks(data, &[4096])).unwrap(), data);
}

#[test]
fn test_seeded_binary_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..70_000).map(|_| rng.gen()).collect();
    assert_eq!(decompress(&compress(&data)).unwrap(), data);
    assert_eq!(decompress(&compress_fast(&data)).unwrap(), data);
}

#[test]
fn test_long_distance_matches() {
    let mut rng = StdRng::seed_from_u64(7);
    let block: Vec<u8> = (0..1000).map(|_| rng.gen()).collect();
    let mut data = block.clone();
    data.extend((0..60_000).map(|_| rng.gen::<u8>()));
    data.extend_from_slice(&block);

    let compressed = compress(&data);
    assert_block_bounds(&compressed);
    assert_eq!(decompress(&compressed).unwrap(), data);
}

#[test]
fn test_self_overlap_example() {
    assert_eq!(decompress(&[0x02, b'a', b'b', 0x83, 0x02, 0x00]).unwrap(), b"abababab");
}

#[test]
fn test_match_header_without_output() {
    assert!(matches!(
        decompress(&[0x80, 0x05, 0x00, 0x41]),
        Err(Error::MalformedStream { offset: 0, .. })
    ));
}
