//! # convos-crypto
//!
//! Cryptographic primitives for the signed-invite protocol. No algorithm
//! negotiation is permitted — the cryptographic suite is fixed by the
//! protocol: secp256k1 with recoverable ECDSA, SHA-256, HKDF-SHA256, and
//! ChaCha20-Poly1305.
//!
//! ## Modules
//!
//! - [`secp256k1`] — sign/recover with a 1-byte recovery id (§4.1)
//! - [`sha256`] — plain SHA-256 hashing
//! - [`hkdf`] — HKDF-SHA256 key derivation (RFC 5869)
//! - [`chacha20`] — ChaCha20-Poly1305 AEAD encryption (RFC 8439)
//! - [`hex`] — lowercase, even-length hex codec
//! - [`base64url`] — unpadded URL-safe base64 codec
//! - [`constant_time`] — constant-time byte comparison
//! - [`key`] — a zeroize-on-drop wrapper for long-lived private key bytes

pub mod base64url;
pub mod chacha20;
pub mod constant_time;
pub mod hex;
pub mod hkdf;
pub mod key;
pub mod secp256k1;
pub mod sha256;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// ECDSA signature verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// The signature or recovery byte had an invalid shape.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// AEAD decryption failed (authentication tag mismatch).
    #[error("AEAD decryption failed")]
    AeadDecryption,

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
