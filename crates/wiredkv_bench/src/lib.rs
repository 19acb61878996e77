//! Benchmark utilities.

use rand::Rng;
use wiredkv_core::transform::{AesGcmEncryptor, Lz4Compressor, ZstdCompressor};
use wiredkv_core::{CoreResult, Transformer};

/// Secret shared by every benchmark transformer.
pub const BENCH_SECRET: &[u8] = b"bench-secret-0123456789";

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate compressible text of roughly the specified size.
pub fn text_data(size: usize) -> String {
    const WORDS: [&str; 8] = ["wired", "kv", "segment", "log", "value", "key", "ttl", "crc"];
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(size + 8);
    while out.len() < size {
        out.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
        out.push(' ');
    }
    out
}

/// Named transformer setups covering each stage combination.
///
/// # Errors
///
/// Returns an error if an encryptor rejects [`BENCH_SECRET`].
pub fn transformers() -> CoreResult<Vec<(&'static str, Transformer)>> {
    let mut lz4 = Transformer::new();
    lz4.set_compressor(Lz4Compressor);

    let mut zstd = Transformer::new();
    zstd.set_compressor(ZstdCompressor::default());

    let mut aes = Transformer::new();
    aes.set_encryptor(AesGcmEncryptor, BENCH_SECRET)?;

    let mut lz4_aes = Transformer::new();
    lz4_aes.set_compressor(Lz4Compressor);
    lz4_aes.set_encryptor(AesGcmEncryptor, BENCH_SECRET)?;

    Ok(vec![
        ("plain", Transformer::new()),
        ("lz4", lz4),
        ("zstd", zstd),
        ("aes_gcm", aes),
        ("lz4_aes_gcm", lz4_aes),
    ])
}
