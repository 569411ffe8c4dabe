//! Joining a conversation from an invite URL (§4.10).
//!
//! The joiner never holds the creator's private key, so the conversation
//! token inside the payload stays opaque to it — `JoinResult::conversation_id`
//! is the raw encrypted bytes, not a usable conversation id.

use convos_invite::codec;

use crate::substrate::MessagingAgent;
use crate::{MiddlewareError, Result};

/// The raw encrypted conversation token, carried through `join()` without
/// ever being decoded as a conversation id. Only the creator's private key
/// can turn these bytes into a real conversation id, so the type keeps that
/// fact load-bearing rather than documentary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueConversationToken(pub Vec<u8>);

/// What a successful join hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinResult {
    pub conversation_id: OpaqueConversationToken,
    pub creator_inbox_id: String,
    pub invite_tag: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Parse `invite_url`, reject it if expired or self-owned, then open a DM to
/// its creator and send the canonical slug as the DM body.
pub fn join<M: MessagingAgent>(agent: &M, invite_url: &str, now_unix: i64) -> Result<JoinResult> {
    let slug = codec::extract_slug(invite_url)?;
    let parsed = codec::parse(&slug, now_unix)?;

    if parsed.is_expired || parsed.is_conversation_expired {
        return Err(MiddlewareError::InviteExpired);
    }

    let creator_inbox_id = std::str::from_utf8(&parsed.payload.creator_inbox_id)
        .map_err(|_| MiddlewareError::Invite(convos_invite::InviteError::Malformed(
            "creator_inbox_id is not valid utf8".to_string(),
        )))?
        .to_string();

    if creator_inbox_id == agent.inbox_id() {
        return Err(MiddlewareError::SelfOwnedInvite);
    }

    let dm = agent
        .create_dm(&creator_inbox_id)
        .map_err(|e| MiddlewareError::Substrate(e.0))?;
    dm.send_text(&slug).map_err(|e| MiddlewareError::Substrate(e.0))?;

    Ok(JoinResult {
        conversation_id: OpaqueConversationToken(parsed.payload.conversation_token.clone()),
        creator_inbox_id,
        invite_tag: parsed.payload.tag.clone(),
        name: parsed.payload.name.clone(),
        description: parsed.payload.description.clone(),
    })
}
