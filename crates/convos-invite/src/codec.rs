//! Signed invite construction, parsing, verification, and decryption
//! (§4.5), plus slug↔URL conversion across the legacy shapes still found in
//! the wild.

use convos_crypto::{base64url, constant_time, secp256k1, sha256};
use convos_wire::{InvitePayload, SignedInvite};

use crate::token::ConversationId;
use crate::{framing, token, InviteError, Result};

/// Inputs needed to mint a fresh invite (§4.5 Build).
pub struct BuildInvite {
    pub conversation_id: ConversationId,
    pub invite_tag: String,
    pub creator_inbox_id: String,
    pub creator_private_key: [u8; 32],
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub conversation_expires_at_unix: Option<i64>,
    pub expires_at_unix: Option<i64>,
    pub expires_after_use: bool,
}

/// A parsed, not-yet-verified invite, together with the expiry facts
/// computed against the wall clock at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInvite {
    pub signed: SignedInvite,
    pub payload: InvitePayload,
    pub is_expired: bool,
    pub is_conversation_expired: bool,
}

/// Mint a slug: build the payload, sign it with recovery, frame, and encode.
pub fn build(input: BuildInvite) -> Result<String> {
    let conversation_token = token::encrypt(
        &input.creator_private_key,
        &input.creator_inbox_id,
        &input.conversation_id,
    )?;

    let payload = InvitePayload {
        conversation_token,
        creator_inbox_id: input.creator_inbox_id.as_bytes().to_vec(),
        tag: input.invite_tag,
        name: input.name,
        description: input.description,
        image_url: input.image_url,
        conversation_expires_at_unix: input.conversation_expires_at_unix,
        expires_at_unix: input.expires_at_unix,
        expires_after_use: input.expires_after_use,
    };

    let encoded_payload = payload.encode_to_vec();
    let hash = sha256::hash(&encoded_payload);
    let signature = secp256k1::sign_recoverable(&hash, &input.creator_private_key)
        .map_err(|e| InviteError::Crypto(e.to_string()))?;

    let signed = SignedInvite {
        payload: encoded_payload,
        signature: signature.to_vec(),
    };

    let encoded_signed = signed.encode_to_vec();
    let framed = framing::compress_if_smaller(&encoded_signed);
    let slug = base64url::encode(&framed);
    Ok(framing::chunk_with_separators(&slug))
}

/// Extract the raw invite slug from a slug or any recognized URL shape
/// (§4.5 Parse), trimming whitespace. Recognition order: `?i=`, `?code=`
/// (legacy), `convos://join/<code>`, trailing path segment, else the whole
/// trimmed input is treated as a raw slug.
pub fn extract_slug(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InviteError::InvalidSlug("empty input".to_string()));
    }

    if let Some(value) = query_param(trimmed, "i") {
        return Ok(value);
    }
    if let Some(value) = query_param(trimmed, "code") {
        return Ok(value);
    }
    if let Some(code) = trimmed.strip_prefix("convos://join/") {
        return Ok(strip_query(code).to_string());
    }
    if trimmed.contains('/') {
        let without_query = strip_query(trimmed);
        if let Some(segment) = without_query.rsplit('/').next() {
            if !segment.is_empty() {
                return Ok(segment.to_string());
            }
        }
        return Err(InviteError::InvalidSlug("empty trailing path segment".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Find `?<key>=<value>` (or `&<key>=<value>`) in a URL-shaped string,
/// stopping at the next `&` or `#`, and percent-decoding the value.
fn query_param(input: &str, key: &str) -> Option<String> {
    let query_start = input.find('?')?;
    let query = &input[query_start + 1..];
    let query = query.split('#').next().unwrap_or(query);

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')) {
            return Some(percent_decode(value));
        }
    }
    None
}

fn strip_query(input: &str) -> &str {
    match input.find(['?', '#']) {
        Some(idx) => &input[..idx],
        None => input,
    }
}

/// Minimal percent-decoder sufficient for slug characters (`A-Za-z0-9_-*`
/// plus the `%XX` escapes a URL encoder may introduce around them).
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(value) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a slug or URL into a [`ParsedInvite`], computing expiry flags
/// against `now_unix` (seconds since epoch).
pub fn parse(input: &str, now_unix: i64) -> Result<ParsedInvite> {
    let slug = extract_slug(input)?;
    let stripped = framing::strip_separators(&slug);
    let framed = base64url::decode(&stripped).map_err(|e| InviteError::InvalidBase64(e.to_string()))?;
    let encoded_signed = framing::decompress(&framed)?;

    let signed = SignedInvite::decode_bytes(&encoded_signed)?;
    let payload = InvitePayload::decode_normalized(&signed.payload)?;

    let is_expired = payload
        .expires_at_unix
        .map(|expires_at| expires_at < now_unix)
        .unwrap_or(false);
    let is_conversation_expired = payload
        .conversation_expires_at_unix
        .map(|expires_at| expires_at < now_unix)
        .unwrap_or(false);

    Ok(ParsedInvite {
        signed,
        payload,
        is_expired,
        is_conversation_expired,
    })
}

/// Verify a signed invite against an expected 65-byte uncompressed public
/// key. Never leaks the reason for a failure — any error collapses to
/// `false`.
pub fn verify(signed: &SignedInvite, expected_public_key: &[u8]) -> bool {
    verify_inner(signed, expected_public_key).unwrap_or(false)
}

fn verify_inner(signed: &SignedInvite, expected_public_key: &[u8]) -> Result<bool> {
    let hash = sha256::hash(&signed.payload);
    let recovered = secp256k1::recover(&hash, &signed.signature)
        .map_err(|e| InviteError::Crypto(e.to_string()))?;
    let expected = secp256k1::normalize_to_uncompressed(expected_public_key)
        .map_err(|e| InviteError::Crypto(e.to_string()))?;
    Ok(constant_time::constant_time_eq(&recovered, &expected))
}

/// Verify a signed invite by deriving the expected public key from a
/// private key first.
pub fn verify_with_private_key(signed: &SignedInvite, private_key: &[u8; 32]) -> bool {
    verify_with_private_key_inner(signed, private_key).unwrap_or(false)
}

fn verify_with_private_key_inner(signed: &SignedInvite, private_key: &[u8; 32]) -> Result<bool> {
    let expected = secp256k1::public_key(private_key).map_err(|e| InviteError::Crypto(e.to_string()))?;
    verify_inner(signed, &expected)
}

/// Decrypt the conversation id concealed in a parsed invite's payload,
/// using the creator's private key and the `creator_inbox_id` carried in
/// the payload itself (not whatever the caller believes it to be).
pub fn decrypt_conversation_id(
    payload: &InvitePayload,
    creator_private_key: &[u8; 32],
) -> Result<ConversationId> {
    let creator_inbox_id = std::str::from_utf8(&payload.creator_inbox_id)
        .map_err(|e| InviteError::Malformed(e.to_string()))?;
    token::decrypt(creator_private_key, creator_inbox_id, &payload.conversation_token)
}

/// Deployment environment selecting the default invite base URL (§4.5,
/// §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Dev,
    Local,
}

impl Environment {
    /// The default base URL for invite links in this environment, absent an
    /// explicit override.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Production => "https://popup.convos.org/v2",
            Environment::Dev | Environment::Local => "https://dev.convos.org/v2",
        }
    }
}

/// Build `<base>?i=<url_encoded_slug>`.
pub fn invite_url(base_url: &str, slug: &str) -> String {
    format!("{base_url}?i={}", url_encode(slug))
}

/// Percent-encode a slug for safe embedding in a URL query value. Invite
/// slugs are already URL-safe base64 plus `*` separators; only `*` needs
/// escaping to survive strictly conformant URL parsers.
fn url_encode(slug: &str) -> String {
    slug.chars()
        .map(|c| if c == '*' { "%2A".to_string() } else { c.to_string() })
        .collect()
}
