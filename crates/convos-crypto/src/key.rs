//! A zeroize-on-drop wrapper for the creator's secp256k1 private key (§5
//! Shared resources: "process-local, read-only after load, and must never
//! be logged").
//!
//! Anything that holds this key for the life of the process (the
//! middleware engine, its config) should hold a [`PrivateKey`] rather than
//! a bare `[u8; 32]`, so the bytes are wiped the moment the holder is
//! dropped instead of lingering in freed memory.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// 32 raw secp256k1 private key bytes, zeroized on drop. Carries no
/// `Debug`/`Display` impl that would print its contents.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl From<[u8; 32]> for PrivateKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}
