//! Structured join-error content type (§4.7).
//!
//! A rejection addressed to the joiner, distinct from a generic DM: UTF-8
//! JSON `{ errorType, inviteTag, timestamp }`. Delivered over a typed-content
//! capable substrate as authority `convos.app`, type `inviteJoinError`,
//! version 1.0. A `versionMinor` field exists in prior wire formats but is
//! unused by any reader; it is not modeled here at all.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{InviteError, Result};

/// Content-type identity for a typed-content capable substrate.
pub const CONTENT_TYPE_AUTHORITY: &str = "convos.app";
pub const CONTENT_TYPE_TYPE_ID: &str = "inviteJoinError";
pub const CONTENT_TYPE_VERSION_MAJOR: u32 = 1;

/// Why a join request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinErrorType {
    ConversationExpired,
    GenericFailure,
    /// Forward-compatibility bucket for any `errorType` this build does not
    /// recognize.
    Unknown,
}

impl JoinErrorType {
    fn as_wire_str(self) -> &'static str {
        match self {
            JoinErrorType::ConversationExpired => "conversationExpired",
            JoinErrorType::GenericFailure => "genericFailure",
            JoinErrorType::Unknown => "unknown",
        }
    }

    fn from_wire_str(value: &str) -> Self {
        match value {
            "conversationExpired" => JoinErrorType::ConversationExpired,
            "genericFailure" => JoinErrorType::GenericFailure,
            _ => JoinErrorType::Unknown,
        }
    }

    /// The fixed user-facing message for this error type.
    pub fn user_message(self) -> &'static str {
        match self {
            JoinErrorType::ConversationExpired => "This conversation is no longer available",
            JoinErrorType::GenericFailure | JoinErrorType::Unknown => {
                "Failed to join conversation"
            }
        }
    }
}

/// The content sent back to a joiner whose request was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinErrorContent {
    pub error_type: JoinErrorType,
    pub invite_tag: String,
    /// Seconds since epoch; serialized as ISO-8601 `Z`.
    pub timestamp_unix: i64,
}

impl JoinErrorContent {
    pub fn new(error_type: JoinErrorType, invite_tag: impl Into<String>, timestamp_unix: i64) -> Self {
        Self {
            error_type,
            invite_tag: invite_tag.into(),
            timestamp_unix,
        }
    }

    /// Build a `ConversationExpired` error for `invite_tag` at `timestamp_unix`.
    pub fn conversation_expired(invite_tag: impl Into<String>, timestamp_unix: i64) -> Self {
        Self::new(JoinErrorType::ConversationExpired, invite_tag, timestamp_unix)
    }

    /// Build a `GenericFailure` error for `invite_tag` at `timestamp_unix`.
    pub fn generic_failure(invite_tag: impl Into<String>, timestamp_unix: i64) -> Self {
        Self::new(JoinErrorType::GenericFailure, invite_tag, timestamp_unix)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let wire = WireErrorContent {
            error_type: self.error_type.as_wire_str().to_string(),
            invite_tag: self.invite_tag.clone(),
            timestamp: format_timestamp(self.timestamp_unix),
        };
        serde_json::to_vec(&wire).map_err(|e| InviteError::Malformed(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wire: WireErrorContent =
            serde_json::from_slice(bytes).map_err(|e| InviteError::Malformed(e.to_string()))?;
        Ok(Self {
            error_type: JoinErrorType::from_wire_str(&wire.error_type),
            invite_tag: wire.invite_tag,
            timestamp_unix: parse_timestamp(&wire.timestamp),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct WireErrorContent {
    #[serde(rename = "errorType")]
    error_type: String,
    #[serde(rename = "inviteTag")]
    invite_tag: String,
    timestamp: String,
}

fn format_timestamp(unix_seconds: i64) -> String {
    chrono::DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .unwrap_or_else(|| chrono::DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is valid"))
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_expired_roundtrips() {
        let content = JoinErrorContent::conversation_expired("tag0000001", 1_700_000_000);
        let encoded = content.encode().expect("encode");
        let decoded = JoinErrorContent::decode(&encoded).expect("decode");
        assert_eq!(decoded, content);
    }

    #[test]
    fn unknown_error_type_collapses_to_unknown() {
        let json = br#"{"errorType":"somethingNew","inviteTag":"x","timestamp":"2024-01-01T00:00:00Z"}"#;
        let decoded = JoinErrorContent::decode(json).expect("decode");
        assert_eq!(decoded.error_type, JoinErrorType::Unknown);
    }

    #[test]
    fn user_messages_are_fixed_strings() {
        assert_eq!(
            JoinErrorType::ConversationExpired.user_message(),
            "This conversation is no longer available"
        );
        assert_eq!(
            JoinErrorType::GenericFailure.user_message(),
            "Failed to join conversation"
        );
        assert_eq!(
            JoinErrorType::Unknown.user_message(),
            "Failed to join conversation"
        );
    }

    #[test]
    fn timestamp_is_iso8601_with_z_suffix() {
        let content = JoinErrorContent::conversation_expired("tag", 1_700_000_000);
        let encoded = content.encode().expect("encode");
        let wire: WireErrorContent = serde_json::from_slice(&encoded).expect("valid json");
        assert!(wire.timestamp.ends_with('Z'));
    }

    #[test]
    fn encoded_json_uses_camel_case_field_names() {
        let content = JoinErrorContent::generic_failure("abc", 0);
        let encoded = content.encode().expect("encode");
        let text = String::from_utf8(encoded).expect("valid utf8");
        assert!(text.contains("\"errorType\""));
        assert!(text.contains("\"inviteTag\""));
        assert!(text.contains("\"timestamp\""));
    }
}
