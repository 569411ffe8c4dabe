//! HKDF-SHA256 key derivation (RFC 5869).
//!
//! The invite protocol derives its conversation-token key purely from the
//! creator's identity (§3): `K = HKDF(ikm = creator_priv, salt, info)`. That
//! derivation must be bit-for-bit reproducible at mint time and at consume
//! time, so this module exposes only a fixed-output-length `derive`.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::{CryptoError, Result};

/// Derive `length` bytes of key material from `ikm`, `salt`, and `info`.
pub fn derive(ikm: &[u8], salt: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

/// Derive exactly 32 bytes of key material, the size every key in this
/// protocol uses.
pub fn derive_32(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<[u8; 32]> {
    let okm = derive(ikm, salt, info, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&okm);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = derive_32(b"ikm", b"salt", b"info").expect("derive");
        let b = derive_32(b"ikm", b"salt", b"info").expect("derive");
        assert_eq!(a, b);
    }

    #[test]
    fn different_info_gives_different_key() {
        let a = derive_32(b"ikm", b"salt", b"info:one").expect("derive");
        let b = derive_32(b"ikm", b"salt", b"info:two").expect("derive");
        assert_ne!(a, b);
    }

    #[test]
    fn different_ikm_gives_different_key() {
        let a = derive_32(b"ikm-a", b"salt", b"info").expect("derive");
        let b = derive_32(b"ikm-b", b"salt", b"info").expect("derive");
        assert_ne!(a, b);
    }

    #[test]
    fn rfc5869_test_case_1() {
        let ikm = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").expect("hex");
        let salt = hex::decode("000102030405060708090a0b0c").expect("hex");
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").expect("hex");
        let okm = derive(&ikm, &salt, &info, 42).expect("derive");
        let expected = hex::decode(
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865",
        )
        .expect("hex");
        assert_eq!(okm, expected);
    }
}
