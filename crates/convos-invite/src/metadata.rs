//! Per-conversation metadata codec (§4.6).
//!
//! Encoded as protobuf, then `compress_if_smaller`-framed, then base64url —
//! the same envelope the invite slug uses minus the `*`-chunking, since this
//! travels inside a group's `app_data` field rather than a URL.

use convos_crypto::base64url;
use convos_wire::{ConversationCustomMetadata, ConversationProfile};
use rand::Rng;

use crate::{framing, InviteError, Result};

const TAG_LENGTH: usize = 10;
const TAG_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh 10-character alphanumeric invite tag.
pub fn generate_tag() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..TAG_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..TAG_ALPHABET.len());
            TAG_ALPHABET[idx] as char
        })
        .collect()
}

/// Build fresh metadata with a newly generated tag and no profiles.
pub fn fresh() -> ConversationCustomMetadata {
    ConversationCustomMetadata {
        tag: generate_tag(),
        profiles: Vec::new(),
        expires_at_unix: None,
        image_encryption_key: None,
    }
}

/// Encode metadata for storage in a group's `app_data` field.
pub fn encode(metadata: &ConversationCustomMetadata) -> String {
    let encoded = metadata.encode_to_vec();
    let framed = framing::compress_if_smaller(&encoded);
    base64url::encode(&framed)
}

/// Decode metadata previously produced by [`encode`].
pub fn decode(app_data: &str) -> Result<ConversationCustomMetadata> {
    let framed = base64url::decode(app_data).map_err(|e| InviteError::InvalidBase64(e.to_string()))?;
    let decoded = framing::decompress(&framed)?;
    Ok(ConversationCustomMetadata::decode_normalized(&decoded)?)
}

/// Decode metadata and return just its current invite tag.
pub fn get_invite_tag(app_data: &str) -> Result<String> {
    Ok(decode(app_data)?.tag)
}

/// Return new metadata identical to `current` except for a freshly
/// generated tag, invalidating all outstanding invites for the
/// conversation.
pub fn rotate_invite_tag(current: &ConversationCustomMetadata) -> ConversationCustomMetadata {
    ConversationCustomMetadata {
        tag: generate_tag(),
        ..current.clone()
    }
}

/// Upsert a profile by `inbox_id`, replacing an existing entry or appending
/// a new one.
pub fn upsert_profile(
    metadata: &mut ConversationCustomMetadata,
    profile: ConversationProfile,
) {
    match metadata
        .profiles
        .iter_mut()
        .find(|existing| existing.inbox_id == profile.inbox_id)
    {
        Some(existing) => *existing = profile,
        None => metadata.profiles.push(profile),
    }
}
