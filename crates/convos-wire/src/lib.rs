//! # convos-wire
//!
//! Deterministic protobuf encode/decode for the three wire messages the
//! invite protocol exchanges: `InvitePayload`, `SignedInvite`, and
//! `ConversationCustomMetadata` (§3, §4.3).
//!
//! Generated types live in `OUT_DIR/convos.invite.v1.rs`, compiled from
//! `proto/invite.proto` by `build.rs` via `prost-build`. This module only
//! adds the encode/decode entry points and a "wire zero means absent"
//! compatibility normalization for `expires_at_unix` and
//! `conversation_expires_at_unix`.

include!(concat!(env!("OUT_DIR"), "/convos.invite.v1.rs"));

use prost::Message;

/// Errors from encoding or decoding a wire message.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

pub type Result<T> = std::result::Result<T, WireError>;

impl InvitePayload {
    /// Canonical, deterministic protobuf encoding.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        Message::encode_to_vec(self)
    }

    /// Decode, normalizing a wire-level zero TTL to "not set" for
    /// compatibility with writers that serialize 0 instead of omitting the
    /// field (§4.3).
    pub fn decode_normalized(buf: &[u8]) -> Result<Self> {
        let mut payload = Self::decode(buf)?;
        if payload.conversation_expires_at_unix == Some(0) {
            payload.conversation_expires_at_unix = None;
        }
        if payload.expires_at_unix == Some(0) {
            payload.expires_at_unix = None;
        }
        Ok(payload)
    }
}

impl SignedInvite {
    pub fn encode_to_vec(&self) -> Vec<u8> {
        Message::encode_to_vec(self)
    }

    pub fn decode_bytes(buf: &[u8]) -> Result<Self> {
        Ok(Self::decode(buf)?)
    }
}

impl ConversationCustomMetadata {
    pub fn encode_to_vec(&self) -> Vec<u8> {
        Message::encode_to_vec(self)
    }

    /// Decode, normalizing a wire-level zero `expires_at_unix` to "not set"
    /// (§4.3), matching `InvitePayload::decode_normalized`.
    pub fn decode_normalized(buf: &[u8]) -> Result<Self> {
        let mut metadata = Self::decode(buf)?;
        if metadata.expires_at_unix == Some(0) {
            metadata.expires_at_unix = None;
        }
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> InvitePayload {
        InvitePayload {
            conversation_token: vec![0x01, 0x02, 0x03],
            creator_inbox_id: b"abc123".to_vec(),
            tag: "tag0000001".to_string(),
            name: Some("Test Group Chat".to_string()),
            description: None,
            image_url: None,
            conversation_expires_at_unix: None,
            expires_at_unix: Some(1_700_000_000),
            expires_after_use: false,
        }
    }

    #[test]
    fn invite_payload_roundtrips() {
        let payload = sample_payload();
        let encoded = payload.encode_to_vec();
        let decoded = InvitePayload::decode_normalized(&encoded).expect("decode");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn unset_optional_fields_are_not_encoded_as_empty() {
        let mut payload = sample_payload();
        payload.description = None;
        let encoded = payload.encode_to_vec();
        let decoded = InvitePayload::decode_normalized(&encoded).expect("decode");
        assert_eq!(decoded.description, None);
    }

    #[test]
    fn expires_after_use_defaults_to_false() {
        let payload = InvitePayload {
            conversation_token: vec![],
            creator_inbox_id: vec![],
            tag: "t".to_string(),
            name: None,
            description: None,
            image_url: None,
            conversation_expires_at_unix: None,
            expires_at_unix: None,
            expires_after_use: false,
        };
        let encoded = payload.encode_to_vec();
        let decoded = InvitePayload::decode_normalized(&encoded).expect("decode");
        assert!(!decoded.expires_after_use);
    }

    #[test]
    fn wire_zero_ttl_normalizes_to_absent() {
        // Simulate a writer that serializes 0 rather than omitting the field
        // by round-tripping through a payload built with Some(0), then
        // asserting the normalized decode treats it as unset.
        let mut payload = sample_payload();
        payload.conversation_expires_at_unix = Some(0);
        let encoded = payload.encode_to_vec();
        let decoded = InvitePayload::decode_normalized(&encoded).expect("decode");
        assert_eq!(decoded.conversation_expires_at_unix, None);
    }

    #[test]
    fn signed_invite_roundtrips() {
        let signed = SignedInvite {
            payload: sample_payload().encode_to_vec(),
            signature: vec![0xAB; 65],
        };
        let encoded = signed.encode_to_vec();
        let decoded = SignedInvite::decode_bytes(&encoded).expect("decode");
        assert_eq!(decoded, signed);
    }

    #[test]
    fn metadata_roundtrips_with_profiles() {
        let metadata = ConversationCustomMetadata {
            tag: "tagabcdefg".to_string(),
            profiles: vec![
                ConversationProfile {
                    inbox_id: b"alice".to_vec(),
                    name: Some("Alice".to_string()),
                    image: None,
                },
                ConversationProfile {
                    inbox_id: b"bob".to_vec(),
                    name: Some("Bob".to_string()),
                    image: Some("https://example.com/bob.png".to_string()),
                },
            ],
            expires_at_unix: None,
            image_encryption_key: None,
        };
        let encoded = metadata.encode_to_vec();
        let decoded = ConversationCustomMetadata::decode_normalized(&encoded).expect("decode");
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn metadata_decodes_with_no_profiles_set() {
        let metadata = ConversationCustomMetadata {
            tag: "tagabcdefg".to_string(),
            profiles: vec![],
            expires_at_unix: None,
            image_encryption_key: None,
        };
        let encoded = metadata.encode_to_vec();
        let decoded = ConversationCustomMetadata::decode_normalized(&encoded).expect("decode");
        assert!(decoded.profiles.is_empty());
    }
}
