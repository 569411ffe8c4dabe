//! # convos-invite
//!
//! Invite construction, parsing, verification, and decryption; the
//! conversation-metadata codec; and the structured join-error content type
//! (spec §4.2, §4.4–§4.7).
//!
//! ## Modules
//!
//! - [`framing`] — compression-aware URL-safe framing
//! - [`token`] — the AEAD-encrypted conversation id
//! - [`codec`] — build/parse/verify/decrypt a signed invite, slug↔URL forms
//! - [`metadata`] — the per-conversation metadata codec
//! - [`error_content`] — the structured join-error content type

pub mod codec;
pub mod error_content;
pub mod framing;
pub mod metadata;
pub mod token;

/// Error taxonomy for the invite pipeline (spec §7). Every cryptographic or
/// format error is consumed by the middleware layer and converted into one
/// of two externally visible outcomes — it never reaches a caller as a raw
/// exception.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid invite slug: {0}")]
    InvalidSlug(String),

    #[error("unsupported conversation token version: {0}")]
    UnsupportedTokenVersion(u8),

    #[error("protobuf decode error: {0}")]
    ProtobufDecode(String),

    #[error("bad signature")]
    BadSignature,

    #[error("creator inbox id mismatch")]
    CreatorMismatch,

    #[error("AEAD authentication failed")]
    BadAuthTag,

    #[error("decompression bomb rejected")]
    DecompressionBomb,

    #[error("malformed invite: {0}")]
    Malformed(String),

    #[error("underlying crypto error: {0}")]
    Crypto(String),
}

pub type Result<T> = std::result::Result<T, InviteError>;

impl From<convos_wire::WireError> for InviteError {
    fn from(err: convos_wire::WireError) -> Self {
        InviteError::ProtobufDecode(err.to_string())
    }
}
