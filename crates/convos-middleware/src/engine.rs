//! The DM classification state machine (§4.8) and its dispatch outer layer.
//!
//! [`classify`] is the stateless functional core named in §5: given a
//! delivery's facts and a way to ask whether a conversation id exists, it
//! returns an [`Outcome`] with no I/O. [`Engine::handle_dm`] is the
//! event-driven shell around it that actually talks to the substrate.

use std::panic::{self, AssertUnwindSafe};

use convos_crypto::key::PrivateKey;
use convos_invite::codec::{self, ParsedInvite};
use convos_invite::error_content::{JoinErrorContent, JoinErrorType};
use convos_invite::token::ConversationId;
use parking_lot::RwLock;

use crate::substrate::{Contacts, Conversation, MessageContent, MessagingAgent};

/// The slug recognizer from §6: 50+ characters drawn only from the invite
/// alphabet. Used to distinguish a malformed invite (block the sender) from
/// ordinary chat (pass through).
const MIN_SUSPECT_SLUG_LEN: usize = 50;

fn looks_like_invite_slug(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() >= MIN_SUSPECT_SLUG_LEN
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '*')
}

/// The decision reached for one DM delivery (§4.8 steps 1–9).
#[derive(Debug)]
pub enum Outcome {
    NotJoinRequest,
    BlockSender,
    SendError {
        error_type: JoinErrorType,
        invite_tag: String,
    },
    Invite(InviteDecision),
}

/// Everything a handler needs to accept or reject a join request.
#[derive(Debug, Clone)]
pub struct InviteDecision {
    pub joiner_inbox_id: String,
    pub conversation_id: ConversationId,
    pub invite_tag: String,
    pub parsed: ParsedInvite,
}

/// Classify one DM delivery. Pure: the only I/O this needs is answered by
/// `conversation_exists`, so callers can test it against a closure instead
/// of a live substrate.
pub fn classify(
    text: Option<&str>,
    sender_inbox_id: &str,
    self_inbox_id: &str,
    self_private_key: &[u8; 32],
    now_unix: i64,
    conversation_exists: impl FnOnce(&str) -> bool,
) -> Outcome {
    let Some(text) = text else {
        return Outcome::NotJoinRequest;
    };
    if sender_inbox_id == self_inbox_id {
        return Outcome::NotJoinRequest;
    }

    let parsed = match codec::parse(text, now_unix) {
        Ok(parsed) => parsed,
        Err(_) => {
            return if looks_like_invite_slug(text) {
                Outcome::BlockSender
            } else {
                Outcome::NotJoinRequest
            };
        }
    };

    if parsed.payload.creator_inbox_id != self_inbox_id.as_bytes() {
        return Outcome::BlockSender;
    }
    if !codec::verify_with_private_key(&parsed.signed, self_private_key) {
        return Outcome::BlockSender;
    }
    if parsed.is_expired || parsed.is_conversation_expired {
        return Outcome::SendError {
            error_type: JoinErrorType::ConversationExpired,
            invite_tag: parsed.payload.tag,
        };
    }

    let conversation_id = match codec::decrypt_conversation_id(&parsed.payload, self_private_key) {
        Ok(id) => id,
        Err(_) => return Outcome::BlockSender,
    };

    if !conversation_exists(&conversation_id.to_string()) {
        return Outcome::SendError {
            error_type: JoinErrorType::ConversationExpired,
            invite_tag: parsed.payload.tag,
        };
    }

    Outcome::Invite(InviteDecision {
        joiner_inbox_id: sender_inbox_id.to_string(),
        invite_tag: parsed.payload.tag.clone(),
        conversation_id,
        parsed,
    })
}

/// The view a registered handler receives for an emitted `invite` event
/// (§4.8 step 9, §9 Callback control flow). `accept`/`reject` close over the
/// substrate handles captured at dispatch time.
pub struct InviteContext<'a, Conv> {
    pub joiner_inbox_id: String,
    pub conversation_id: ConversationId,
    pub invite_tag: String,
    pub parsed: ParsedInvite,
    target_conversation: &'a Conv,
    dm_conversation: &'a Conv,
    now_unix: i64,
}

impl<'a, Conv: Conversation> InviteContext<'a, Conv> {
    /// Add the joiner to the conversation the invite referred to.
    pub fn accept(&self) -> Result<(), crate::MiddlewareError> {
        self.target_conversation
            .add_members(&[self.joiner_inbox_id.clone()])
            .map_err(|e| crate::MiddlewareError::Substrate(e.0))
    }

    /// Send a structured error back to the joiner on the DM it arrived on.
    /// Defaults to `GenericFailure` when no error is specified.
    pub fn reject(&self, error: Option<JoinErrorType>) -> Result<(), crate::MiddlewareError> {
        send_error_content(
            self.dm_conversation,
            &self.invite_tag,
            error.unwrap_or(JoinErrorType::GenericFailure),
            self.now_unix,
        )
    }
}

/// A registered invite handler. Handlers run sequentially, in registration
/// order, against an immutable view; none of them can short-circuit the
/// others (§4.8 Tie-breaks).
type InviteHandler<Conv> = Box<dyn for<'a> Fn(&InviteContext<'a, Conv>) + Send + Sync>;

/// What happened as a result of dispatching one DM delivery, returned to
/// the caller for observability; it carries no further obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    PassThrough,
    Blocked,
    ErrorSent,
    InviteEmitted,
}

/// Owns the creator's identity and the registered invite handlers, and
/// turns one [`classify`] outcome into substrate I/O.
pub struct Engine<M: MessagingAgent> {
    creator_private_key: PrivateKey,
    handlers: RwLock<Vec<InviteHandler<M::Conversation>>>,
}

impl<M: MessagingAgent> Engine<M> {
    pub fn new(creator_private_key: [u8; 32]) -> Self {
        Self {
            creator_private_key: PrivateKey::new(creator_private_key),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register an invite handler. Handlers are serialized with respect to
    /// registration and dispatch on the same engine (§5 Scheduling model).
    pub fn on_invite<F>(&self, handler: F)
    where
        F: for<'a> Fn(&InviteContext<'a, M::Conversation>) + Send + Sync + 'static,
    {
        self.handlers.write().push(Box::new(handler));
    }

    /// Classify and act on one DM delivery.
    pub fn handle_dm(
        &self,
        substrate: &M,
        dm_conversation: &M::Conversation,
        sender_inbox_id: &str,
        content: &MessageContent,
        now_unix: i64,
    ) -> Result<DispatchOutcome, crate::MiddlewareError> {
        let self_inbox_id = substrate.inbox_id().to_string();
        let outcome = classify(
            content.extract_text(),
            sender_inbox_id,
            &self_inbox_id,
            self.creator_private_key.as_bytes(),
            now_unix,
            |conversation_id| substrate.get_conversation_by_id(conversation_id).is_some(),
        );

        match outcome {
            Outcome::NotJoinRequest => Ok(DispatchOutcome::PassThrough),
            Outcome::BlockSender => {
                block_sender(substrate, sender_inbox_id);
                Ok(DispatchOutcome::Blocked)
            }
            Outcome::SendError { error_type, invite_tag } => {
                if let Err(e) = send_error_content(dm_conversation, &invite_tag, error_type, now_unix) {
                    tracing::warn!(error = %e, "failed to deliver join error content");
                }
                Ok(DispatchOutcome::ErrorSent)
            }
            Outcome::Invite(decision) => {
                let Some(target_conversation) =
                    substrate.get_conversation_by_id(&decision.conversation_id.to_string())
                else {
                    // Vanished between the existence check in `classify` and
                    // here; tell the joiner rather than silently dropping it.
                    if let Err(e) = send_error_content(
                        dm_conversation,
                        &decision.invite_tag,
                        JoinErrorType::ConversationExpired,
                        now_unix,
                    ) {
                        tracing::warn!(error = %e, "failed to deliver join error content");
                    }
                    return Ok(DispatchOutcome::ErrorSent);
                };

                let ctx = InviteContext {
                    joiner_inbox_id: decision.joiner_inbox_id,
                    conversation_id: decision.conversation_id,
                    invite_tag: decision.invite_tag,
                    parsed: decision.parsed,
                    target_conversation: &target_conversation,
                    dm_conversation,
                    now_unix,
                };

                self.dispatch_invite(&ctx, dm_conversation, now_unix);
                Ok(DispatchOutcome::InviteEmitted)
            }
        }
    }

    fn dispatch_invite(
        &self,
        ctx: &InviteContext<'_, M::Conversation>,
        dm_conversation: &M::Conversation,
        now_unix: i64,
    ) {
        let handlers = self.handlers.read();
        for handler in handlers.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(ctx)));
            if outcome.is_err() {
                tracing::error!(invite_tag = %ctx.invite_tag, "invite handler panicked");
                if let Err(e) = send_error_content(
                    dm_conversation,
                    &ctx.invite_tag,
                    JoinErrorType::GenericFailure,
                    now_unix,
                ) {
                    tracing::warn!(error = %e, "failed to deliver join error content after handler panic");
                }
            }
        }
    }
}

/// BlockSender action (§4.8): refresh the consent list, then block the
/// sender. Both steps are fire-and-forget; failures are logged, not
/// propagated.
fn block_sender<M: MessagingAgent>(substrate: &M, sender_inbox_id: &str) {
    if let Err(e) = substrate.contacts().refresh_consent_list() {
        tracing::warn!(error = %e, "consent list refresh failed");
    }
    if let Err(e) = substrate.contacts().block(&[sender_inbox_id.to_string()]) {
        tracing::warn!(error = %e, sender = sender_inbox_id, "blocking sender failed");
    }
}

/// SendError action (§4.8): encode the error content and deliver it on the
/// DM conversation.
fn send_error_content<Conv: Conversation>(
    conversation: &Conv,
    invite_tag: &str,
    error_type: JoinErrorType,
    now_unix: i64,
) -> Result<(), crate::MiddlewareError> {
    let content = JoinErrorContent::new(error_type, invite_tag.to_string(), now_unix);
    let encoded = content.encode()?;
    conversation
        .send_bytes(&encoded)
        .map_err(|e| crate::MiddlewareError::Substrate(e.0))
}
