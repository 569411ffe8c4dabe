//! # convos-middleware
//!
//! The join-request classification engine that sits in front of a direct-
//! message delivery, plus the group wrapper that issues invites and manages
//! per-conversation profiles on top of it (spec §4.8–§4.10).
//!
//! ## Modules
//!
//! - [`config`] — the single construction-time edge where environment
//!   variables are read
//! - [`substrate`] — the capability interface this crate consumes from the
//!   host messaging substrate
//! - [`engine`] — the DM classification state machine and dispatch
//! - [`group`] — lazy invite metadata and profile management for one group
//! - [`join`] — joining a conversation from an invite URL

pub mod config;
pub mod engine;
pub mod group;
pub mod join;
pub mod substrate;

/// Error taxonomy for the middleware layer. Cryptographic and codec errors
/// from `convos-invite` are never surfaced past the engine boundary — see
/// [`engine`] for how they fold into `BlockSender` / `SendError` outcomes.
/// This enum covers only the layer's own I/O and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("invalid creator private key: {0}")]
    InvalidPrivateKey(String),

    #[error("substrate operation failed: {0}")]
    Substrate(String),

    #[error("invite error: {0}")]
    Invite(#[from] convos_invite::InviteError),

    #[error("invite has expired")]
    InviteExpired,

    #[error("cannot join a conversation you created")]
    SelfOwnedInvite,
}

pub type Result<T> = std::result::Result<T, MiddlewareError>;
