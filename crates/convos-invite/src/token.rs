//! The AEAD-encrypted conversation id carried inside an invite (§3, §4.4).
//!
//! `token = version(1) ‖ nonce(12) ‖ ChaCha20-Poly1305(K, nonce, aad, plaintext)`
//! where `K` is derived purely from the creator's identity, so it can be
//! recomputed identically at mint time and at consume time without storing
//! anything extra in the invite.

use convos_crypto::chacha20;
use rand::RngCore;
use uuid::Uuid;

use crate::{InviteError, Result};

/// The only conversation-token wire version this workspace understands.
pub const TOKEN_VERSION: u8 = 0x01;

const HKDF_SALT: &[u8] = b"ConvosInviteV1";

/// Typed conversation id carried inside the encrypted token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationId {
    /// A canonical (lowercase, hyphenated) UUID.
    Uuid(Uuid),
    /// An opaque string identifier.
    Text(String),
}

impl ConversationId {
    /// Parse a caller-supplied UUID string, case-insensitively, as the UUID
    /// variant. Any other string is carried verbatim as `Text`.
    pub fn from_str_lossy(value: &str) -> Self {
        match Uuid::parse_str(value) {
            Ok(uuid) => ConversationId::Uuid(uuid),
            Err(_) => ConversationId::Text(value.to_string()),
        }
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Uuid's Display impl is already lowercase hyphenated form.
            ConversationId::Uuid(uuid) => write!(f, "{uuid}"),
            ConversationId::Text(text) => write!(f, "{text}"),
        }
    }
}

const PACK_TAG_UUID: u8 = 0x01;
const PACK_TAG_TEXT: u8 = 0x02;
const PACK_TEXT_LONG_MARKER: u8 = 0x00;
const SHORT_TEXT_MAX_LEN: usize = 255;

/// Pack a conversation id into the typed plaintext format (§4.4).
fn pack(id: &ConversationId) -> Vec<u8> {
    match id {
        ConversationId::Uuid(uuid) => {
            let mut out = Vec::with_capacity(17);
            out.push(PACK_TAG_UUID);
            out.extend_from_slice(uuid.as_bytes());
            out
        }
        ConversationId::Text(text) => {
            let bytes = text.as_bytes();
            let mut out = Vec::with_capacity(2 + bytes.len());
            out.push(PACK_TAG_TEXT);
            if bytes.len() <= SHORT_TEXT_MAX_LEN && !bytes.is_empty() {
                out.push(bytes.len() as u8);
            } else {
                out.push(PACK_TEXT_LONG_MARKER);
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            }
            out.extend_from_slice(bytes);
            out
        }
    }
}

/// Unpack the typed plaintext format, enforcing exact length match.
fn unpack(plaintext: &[u8]) -> Result<ConversationId> {
    let (&tag, rest) = plaintext
        .split_first()
        .ok_or_else(|| InviteError::Malformed("empty conversation token plaintext".to_string()))?;

    match tag {
        PACK_TAG_UUID => {
            if rest.len() != 16 {
                return Err(InviteError::Malformed(format!(
                    "expected 16-byte UUID payload, got {}",
                    rest.len()
                )));
            }
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(rest);
            Ok(ConversationId::Uuid(Uuid::from_bytes(bytes)))
        }
        PACK_TAG_TEXT => {
            let (&len_byte, body) = rest
                .split_first()
                .ok_or_else(|| InviteError::Malformed("truncated text length".to_string()))?;
            let (len, body) = if len_byte == PACK_TEXT_LONG_MARKER {
                if body.len() < 2 {
                    return Err(InviteError::Malformed("truncated long length".to_string()));
                }
                let (len_bytes, body) = body.split_at(2);
                (u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize, body)
            } else {
                (len_byte as usize, body)
            };
            if body.len() != len {
                return Err(InviteError::Malformed(format!(
                    "declared text length {len} does not match {} remaining bytes",
                    body.len()
                )));
            }
            let text = std::str::from_utf8(body)
                .map_err(|e| InviteError::Malformed(e.to_string()))?
                .to_string();
            Ok(ConversationId::Text(text))
        }
        other => Err(InviteError::Malformed(format!(
            "unknown conversation id tag {other}"
        ))),
    }
}

/// Derive the conversation-token key: purely a function of the creator's
/// identity, recomputed identically on mint and on consume.
pub fn derive_key(creator_private_key: &[u8; 32], creator_inbox_id: &str) -> Result<[u8; 32]> {
    let info = format!("inbox:{creator_inbox_id}");
    convos_crypto::hkdf::derive_32(creator_private_key, HKDF_SALT, info.as_bytes())
        .map_err(|e| InviteError::Crypto(e.to_string()))
}

/// Encrypt a conversation id into a versioned, AEAD-protected token.
pub fn encrypt(
    creator_private_key: &[u8; 32],
    creator_inbox_id: &str,
    conversation_id: &ConversationId,
) -> Result<Vec<u8>> {
    let key = derive_key(creator_private_key, creator_inbox_id)?;
    let aad = creator_inbox_id.as_bytes();
    let plaintext = pack(conversation_id);

    let mut nonce = [0u8; chacha20::NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = chacha20::encrypt(&key, &nonce, &plaintext, aad)
        .map_err(|e| InviteError::Crypto(e.to_string()))?;

    let mut token = Vec::with_capacity(1 + nonce.len() + ciphertext.len());
    token.push(TOKEN_VERSION);
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&ciphertext);
    Ok(token)
}

/// Decrypt a conversation token back into its typed conversation id.
///
/// `creator_inbox_id` must be the same value used at encrypt time — it is
/// bound into both the derived key and the AEAD's associated data.
pub fn decrypt(
    creator_private_key: &[u8; 32],
    creator_inbox_id: &str,
    token: &[u8],
) -> Result<ConversationId> {
    let (&version, rest) = token
        .split_first()
        .ok_or_else(|| InviteError::Malformed("empty conversation token".to_string()))?;
    if version != TOKEN_VERSION {
        return Err(InviteError::UnsupportedTokenVersion(version));
    }

    if rest.len() < chacha20::NONCE_SIZE {
        return Err(InviteError::Malformed("conversation token too short".to_string()));
    }
    let (nonce_bytes, ciphertext) = rest.split_at(chacha20::NONCE_SIZE);
    let mut nonce = [0u8; chacha20::NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);

    let key = derive_key(creator_private_key, creator_inbox_id)?;
    let aad = creator_inbox_id.as_bytes();

    let plaintext = chacha20::decrypt(&key, &nonce, ciphertext, aad)
        .map_err(|_| InviteError::BadAuthTag)?;

    unpack(&plaintext)
}
