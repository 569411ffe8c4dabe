//! Lazy invite metadata and per-conversation profiles (§4.9).
//!
//! `GroupWrapper` only needs three methods off a conversation — `id`,
//! `app_data`, `update_app_data` — plus the caller's own inbox id, so it
//! holds a narrow handle rather than the whole engine (§9 Cyclic/dynamic
//! registration).

use convos_invite::codec::{self, BuildInvite};
use convos_invite::token::ConversationId;
use convos_wire::{ConversationCustomMetadata, ConversationProfile};

use crate::substrate::Conversation;
use crate::{MiddlewareError, Result};

/// Inputs to [`GroupWrapper::create_invite`] beyond what the wrapper
/// already knows (group id, current tag, caller's inbox id).
pub struct CreateInviteOptions {
    pub creator_private_key: [u8; 32],
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub conversation_expires_at_unix: Option<i64>,
    pub expires_at_unix: Option<i64>,
    pub expires_after_use: bool,
}

/// Wraps a single conversation, providing `createInvite` and
/// `setConversationProfile` on top of its opaque `app_data` string.
pub struct GroupWrapper<'a, Conv> {
    conversation: &'a Conv,
    self_inbox_id: String,
}

impl<'a, Conv: Conversation> GroupWrapper<'a, Conv> {
    pub fn new(conversation: &'a Conv, self_inbox_id: impl Into<String>) -> Self {
        Self {
            conversation,
            self_inbox_id: self_inbox_id.into(),
        }
    }

    /// Read (or lazily create and persist) the conversation's current
    /// metadata, then mint an invite slug for it.
    pub fn create_invite(&self, options: CreateInviteOptions) -> Result<String> {
        let metadata = self.load_or_init_metadata()?;

        let slug = codec::build(BuildInvite {
            conversation_id: ConversationId::from_str_lossy(self.conversation.id()),
            invite_tag: metadata.tag,
            creator_inbox_id: self.self_inbox_id.clone(),
            creator_private_key: options.creator_private_key,
            name: options.name,
            description: options.description,
            image_url: options.image_url,
            conversation_expires_at_unix: options.conversation_expires_at_unix,
            expires_at_unix: options.expires_at_unix,
            expires_after_use: options.expires_after_use,
        })?;
        Ok(slug)
    }

    /// Upsert the caller's own profile (keyed by `self_inbox_id`) into the
    /// conversation's metadata and persist it.
    pub fn set_conversation_profile(&self, name: Option<String>, image: Option<String>) -> Result<()> {
        let mut metadata = self.load_or_default_metadata();
        convos_invite::metadata::upsert_profile(
            &mut metadata,
            ConversationProfile {
                inbox_id: self.self_inbox_id.as_bytes().to_vec(),
                name,
                image,
            },
        );
        self.persist(&metadata)
    }

    /// Rotate the invite tag, invalidating all outstanding invites, and
    /// persist the result.
    pub fn rotate_invite_tag(&self) -> Result<()> {
        let metadata = self.load_or_default_metadata();
        let rotated = convos_invite::metadata::rotate_invite_tag(&metadata);
        self.persist(&rotated)
    }

    /// Reuse the current tag if `app_data` decodes to non-empty metadata;
    /// otherwise generate and persist fresh metadata.
    fn load_or_init_metadata(&self) -> Result<ConversationCustomMetadata> {
        let raw = self.conversation.app_data();
        if !raw.is_empty() {
            if let Ok(metadata) = convos_invite::metadata::decode(&raw) {
                if !metadata.tag.is_empty() {
                    return Ok(metadata);
                }
            }
        }
        let fresh = convos_invite::metadata::fresh();
        self.persist(&fresh)?;
        Ok(fresh)
    }

    /// Same fallback as [`Self::load_or_init_metadata`] but never persists;
    /// the caller (`set_conversation_profile`) persists the upserted result
    /// in one write.
    fn load_or_default_metadata(&self) -> ConversationCustomMetadata {
        let raw = self.conversation.app_data();
        if raw.is_empty() {
            return convos_invite::metadata::fresh();
        }
        convos_invite::metadata::decode(&raw).unwrap_or_else(|_| convos_invite::metadata::fresh())
    }

    fn persist(&self, metadata: &ConversationCustomMetadata) -> Result<()> {
        let encoded = convos_invite::metadata::encode(metadata);
        self.conversation
            .update_app_data(encoded)
            .map_err(|e| MiddlewareError::Substrate(e.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::SubstrateError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeConversation {
        id: String,
        app_data: Mutex<String>,
    }

    impl FakeConversation {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                app_data: Mutex::new(String::new()),
            }
        }
    }

    impl Conversation for FakeConversation {
        fn id(&self) -> &str {
            &self.id
        }

        fn send_bytes(&self, _bytes: &[u8]) -> std::result::Result<(), SubstrateError> {
            Ok(())
        }

        fn add_members(&self, _inbox_ids: &[String]) -> std::result::Result<(), SubstrateError> {
            Ok(())
        }

        fn app_data(&self) -> String {
            self.app_data.lock().clone()
        }

        fn update_app_data(&self, data: String) -> std::result::Result<(), SubstrateError> {
            *self.app_data.lock() = data;
            Ok(())
        }
    }

    fn invite_options() -> CreateInviteOptions {
        CreateInviteOptions {
            creator_private_key: [0x03; 32],
            name: None,
            description: None,
            image_url: None,
            conversation_expires_at_unix: None,
            expires_at_unix: None,
            expires_after_use: false,
        }
    }

    #[test]
    fn create_invite_lazily_initializes_metadata() {
        let conversation = FakeConversation::new("group-1");
        let wrapper = GroupWrapper::new(&conversation, "creator-inbox");

        assert!(conversation.app_data().is_empty());
        wrapper.create_invite(invite_options()).expect("create invite");
        assert!(!conversation.app_data().is_empty());
    }

    #[test]
    fn create_invite_reuses_existing_tag() {
        let conversation = FakeConversation::new("group-2");
        let wrapper = GroupWrapper::new(&conversation, "creator-inbox");

        wrapper.create_invite(invite_options()).expect("first invite");
        let metadata_after_first = convos_invite::metadata::decode(&conversation.app_data()).expect("decode");

        wrapper.create_invite(invite_options()).expect("second invite");
        let metadata_after_second = convos_invite::metadata::decode(&conversation.app_data()).expect("decode");

        assert_eq!(metadata_after_first.tag, metadata_after_second.tag);
    }

    #[test]
    fn set_conversation_profile_upserts_then_replaces() {
        let conversation = FakeConversation::new("group-3");
        let wrapper = GroupWrapper::new(&conversation, "self-inbox");

        wrapper
            .set_conversation_profile(Some("A".to_string()), None)
            .expect("first upsert");
        wrapper
            .set_conversation_profile(Some("B".to_string()), Some("u".to_string()))
            .expect("second upsert");

        let metadata = convos_invite::metadata::decode(&conversation.app_data()).expect("decode");
        assert_eq!(metadata.profiles.len(), 1);
        assert_eq!(metadata.profiles[0].name, Some("B".to_string()));
        assert_eq!(metadata.profiles[0].image, Some("u".to_string()));
    }

    #[test]
    fn rotate_invite_tag_changes_tag_and_persists() {
        let conversation = FakeConversation::new("group-4");
        let wrapper = GroupWrapper::new(&conversation, "creator-inbox");

        wrapper.create_invite(invite_options()).expect("create invite");
        let before = convos_invite::metadata::decode(&conversation.app_data()).expect("decode");

        wrapper.rotate_invite_tag().expect("rotate");
        let after = convos_invite::metadata::decode(&conversation.app_data()).expect("decode");

        assert_ne!(before.tag, after.tag);
    }
}
