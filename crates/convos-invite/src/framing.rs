//! Compression-aware URL-safe framing (§4.2).
//!
//! Two independent layers stack on top of the protobuf bytes before a slug
//! reaches a URL: DEFLATE-if-smaller, then `*`-separator chunking so certain
//! messenger clients recognize the link boundaries.

use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Read;

use crate::{InviteError, Result};

/// Marker byte prepended when the payload is DEFLATE-compressed.
pub const COMPRESSION_MARKER: u8 = 0x78;

/// Below this size, compression is never attempted.
const MIN_COMPRESS_INPUT: usize = 100;

/// Decompressed output larger than this is rejected as a decompression bomb.
const MAX_DECOMPRESSED_SIZE: usize = 1024 * 1024;

/// Chunk width for the `*`-separated slug framing.
const CHUNK_SIZE: usize = 300;

/// Compress `input` with DEFLATE if doing so — plus the one marker byte —
/// is strictly smaller than `input`. Otherwise return `input` unchanged.
/// Inputs shorter than 100 bytes are never compressed.
pub fn compress_if_smaller(input: &[u8]) -> Vec<u8> {
    if input.len() < MIN_COMPRESS_INPUT {
        return input.to_vec();
    }

    let mut encoder = DeflateEncoder::new(input, Compression::best());
    let mut compressed = Vec::new();
    if encoder.read_to_end(&mut compressed).is_err() {
        return input.to_vec();
    }

    if compressed.len() + 1 < input.len() {
        let mut out = Vec::with_capacity(compressed.len() + 1);
        out.push(COMPRESSION_MARKER);
        out.extend_from_slice(&compressed);
        out
    } else {
        input.to_vec()
    }
}

/// Invert [`compress_if_smaller`]. If `input[0] == 0x78`, inflate the rest;
/// otherwise return `input` unchanged. Rejects decompressed output larger
/// than 1 MiB before returning it.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    match input.first() {
        Some(&COMPRESSION_MARKER) => {
            let mut decoder = DeflateDecoder::new(&input[1..]);
            let mut out = Vec::new();
            let mut limited = (&mut decoder).take(MAX_DECOMPRESSED_SIZE as u64 + 1);
            limited
                .read_to_end(&mut out)
                .map_err(|e| InviteError::Malformed(format!("deflate error: {e}")))?;
            if out.len() > MAX_DECOMPRESSED_SIZE {
                return Err(InviteError::DecompressionBomb);
            }
            Ok(out)
        }
        _ => Ok(input.to_vec()),
    }
}

/// Split `input` into `*`-joined chunks of at most 300 characters.
pub fn chunk_with_separators(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / CHUNK_SIZE);
    for (i, ch) in input.chars().enumerate() {
        if i > 0 && i % CHUNK_SIZE == 0 {
            out.push('*');
        }
        out.push(ch);
    }
    out
}

/// Remove all `*` separators from a slug.
pub fn strip_separators(input: &str) -> String {
    input.chars().filter(|&c| c != '*').collect()
}
