//! Plain SHA-256 hashing.
//!
//! Used to hash the encoded `InvitePayload` before signing (§3, §4.5) — the
//! protocol signs the digest, never the raw payload bytes.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"convos"), hash(b"convos"));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(hash(b"a"), hash(b"b"));
    }

    #[test]
    fn known_test_vector() {
        // SHA-256("abc")
        let expected = hex::decode(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        )
        .expect("valid hex");
        assert_eq!(hash(b"abc").to_vec(), expected);
    }
}
