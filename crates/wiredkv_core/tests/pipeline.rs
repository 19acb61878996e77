//! Integration tests for segments flowing through the transform pipeline
//! and the storage backends.

use proptest::prelude::*;
use std::io::Cursor;
use tempfile::TempDir;
use wiredkv_core::transform::{AesGcmEncryptor, Lz4Compressor, ZstdCompressor};
use wiredkv_core::{
    Binary, CompressionAlgorithm, CoreError, Kind, Number, Segment, Serializable, Text,
    TransformConfig, Transformer, HEADER_SIZE,
};
use wiredkv_storage::{FileBackend, InMemoryBackend, StorageBackend};

const SECRET: &[u8] = b"integration-secret-0001";

/// Every combination of the two stages, each with both capabilities bound.
fn configurations() -> Vec<Transformer> {
    let mut out = Vec::new();
    for (compress, encrypt) in [(false, false), (true, false), (false, true), (true, true)] {
        let mut t = Transformer::new();
        t.set_compressor(Lz4Compressor);
        t.set_encryptor(AesGcmEncryptor, SECRET).unwrap();
        if !compress {
            t.disable_compression();
        }
        if !encrypt {
            t.disable_encryption();
        }
        out.push(t);
    }
    out
}

/// Strategy for record keys.
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for raw payloads.
fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

proptest! {
    #[test]
    fn pipeline_round_trips(payload in payload_strategy()) {
        for transformer in configurations() {
            let stored = transformer.encode(&payload).unwrap();
            prop_assert_eq!(transformer.decode(&stored).unwrap(), payload.clone());
        }
    }

    #[test]
    fn size_matches_encoded_length(
        key in key_strategy(),
        payload in payload_strategy(),
        ttl in 0u64..100_000,
    ) {
        for transformer in configurations() {
            let value = Binary::new(payload.clone());
            let segment = Segment::new(key.clone(), &value, ttl, &transformer).unwrap();
            let bytes = segment.encode();
            prop_assert_eq!(bytes.len() as u64, segment.size());
            prop_assert_eq!(
                segment.size(),
                HEADER_SIZE as u64 + key.len() as u64 + u64::from(segment.value_size()) + 4
            );

            let decoded = Segment::decode(&bytes).unwrap();
            prop_assert_eq!(decoded.key(), key.as_slice());
            prop_assert_eq!(
                decoded.to_binary(&transformer).unwrap(),
                Some(Binary::new(payload.clone()))
            );
        }
    }

    #[test]
    fn numbers_survive_every_configuration(n in any::<i64>()) {
        for transformer in configurations() {
            let segment = Segment::new("n", &Number::new(n), 0, &transformer).unwrap();
            prop_assert_eq!(segment.kind(), Kind::Number);
            prop_assert_eq!(segment.to_number(&transformer).unwrap(), Some(Number::new(n)));
        }
    }
}

#[test]
fn log_of_mixed_records_on_disk() {
    let dir = TempDir::new().unwrap();
    let transformer = Transformer::from_config(
        &TransformConfig::new()
            .compression(CompressionAlgorithm::Zstd { level: 3 })
            .encryption_secret(SECRET.to_vec()),
    )
    .unwrap();

    let records = vec![
        Segment::new("greeting", &Text::new("hello world"), 0, &transformer).unwrap(),
        Segment::new("counter", &Number::new(7), 60, &transformer).unwrap(),
        Segment::tombstone("greeting").unwrap(),
    ];

    let path = dir.path().join("data.wkv");
    let mut offsets = Vec::new();
    {
        let mut log = FileBackend::open(&path).unwrap();
        for record in &records {
            offsets.push(log.append(&record.encode()).unwrap());
        }
        log.sync().unwrap();
    }

    let log = FileBackend::open(&path).unwrap();
    let total: u64 = records.iter().map(Segment::size).sum();
    assert_eq!(log.size().unwrap(), total);

    for (record, offset) in records.iter().zip(&offsets) {
        assert_eq!(&Segment::read_at(&log, *offset).unwrap(), record);
    }

    let greeting = Segment::read_at(&log, offsets[0]).unwrap();
    assert_eq!(
        greeting.to_text(&transformer).unwrap(),
        Some(Text::new("hello world"))
    );
    let counter = Segment::read_at(&log, offsets[1]).unwrap();
    assert!((1..=60).contains(&counter.ttl()));
    assert!(Segment::read_at(&log, offsets[2]).unwrap().is_tombstone());
}

#[test]
fn corrupt_log_is_detected() {
    let transformer = Transformer::new();
    let segment = Segment::new("k", &Text::new("v"), 0, &transformer).unwrap();
    let mut bytes = segment.encode();
    let last_value_byte = bytes.len() - 5;
    bytes[last_value_byte] ^= 0xFF;

    let log = InMemoryBackend::with_bytes(bytes);
    assert!(matches!(
        Segment::read_at(&log, 0),
        Err(CoreError::ChecksumMismatch { .. })
    ));
}

#[test]
fn value_stream_uses_reverse_order() {
    let mut transformer = Transformer::new();
    transformer.set_compressor(ZstdCompressor::default());
    transformer.set_encryptor(AesGcmEncryptor, SECRET).unwrap();

    let payload = Text::new("stream ".repeat(64)).to_canonical_bytes().unwrap();
    let mut sink = Vec::new();
    let written = transformer.write(&mut sink, &payload).unwrap();
    assert_eq!(written, sink.len());

    let mut source = Cursor::new(sink);
    assert_eq!(transformer.read(&mut source, written).unwrap(), payload);
}

