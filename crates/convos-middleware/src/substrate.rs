//! The capability interface this crate consumes from the host messaging
//! substrate (§6 External interfaces, §9 Dynamic content types).
//!
//! None of these traits are implemented here — the host wires a concrete
//! substrate client into them. Keeping the interface narrow (rather than
//! depending on the substrate's full SDK) is what lets [`engine`](crate::engine)
//! and [`group`](crate::group) stay testable against an in-memory fake.

/// A single direct or group conversation.
pub trait Conversation {
    /// The substrate-assigned conversation id.
    fn id(&self) -> &str;

    /// Send raw bytes on this conversation.
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SubstrateError>;

    /// Send UTF-8 text. Substrates without a dedicated text path fall back
    /// to `send_bytes`.
    fn send_text(&self, text: &str) -> Result<(), SubstrateError> {
        self.send_bytes(text.as_bytes())
    }

    /// Add members to this conversation.
    fn add_members(&self, inbox_ids: &[String]) -> Result<(), SubstrateError>;

    /// The conversation's opaque persisted metadata string.
    fn app_data(&self) -> String;

    /// Overwrite the conversation's persisted metadata string.
    fn update_app_data(&self, data: String) -> Result<(), SubstrateError>;
}

/// The consent list, owned by the substrate.
pub trait Contacts {
    fn refresh_consent_list(&self) -> Result<(), SubstrateError>;
    fn block(&self, inbox_ids: &[String]) -> Result<(), SubstrateError>;
}

/// The messaging substrate capability this crate depends on: conversation
/// lookup/creation and the consent list.
pub trait MessagingAgent {
    type Conversation: Conversation;
    type Contacts: Contacts;

    /// This agent's own inbox id.
    fn inbox_id(&self) -> &str;

    fn get_conversation_by_id(&self, id: &str) -> Option<Self::Conversation>;

    fn create_group(
        &self,
        members: &[String],
        name: Option<String>,
        description: Option<String>,
        app_data: Option<String>,
    ) -> Result<Self::Conversation, SubstrateError>;

    fn create_dm(&self, inbox_id: &str) -> Result<Self::Conversation, SubstrateError>;

    fn list_conversations(&self) -> Vec<Self::Conversation>;

    fn contacts(&self) -> &Self::Contacts;
}

/// An I/O failure at the substrate boundary. Per §7, this is the one kind
/// of error the engine propagates upward rather than folding into
/// `BlockSender` / `SendError`.
#[derive(Debug, thiserror::Error)]
#[error("substrate unavailable: {0}")]
pub struct SubstrateError(pub String);

/// A content-typed message body, modeled as a tagged variant so the engine
/// never needs to know the substrate's concrete message type (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Bytes(Vec<u8>),
    Unknown,
}

impl MessageContent {
    /// The message's text, if it carries any. Only the `Text` variant does.
    pub fn extract_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Bytes(_) | MessageContent::Unknown => None,
        }
    }
}
