//! Construction-time configuration (§6 Configuration surface, §9 Global
//! state).
//!
//! Environment variables are read exactly once, here, and never again:
//! crypto and codec paths never touch `std::env`.

use convos_crypto::key::PrivateKey;
use convos_invite::codec::Environment;

use crate::{MiddlewareError, Result};

/// The creator's private key, where to send invite links, and which
/// deployment's defaults to fall back on.
#[derive(Clone)]
pub struct Config {
    creator_private_key: PrivateKey,
    pub invite_base_url: Option<String>,
    pub env: Environment,
}

impl Config {
    pub fn new(creator_private_key: [u8; 32], env: Environment, invite_base_url: Option<String>) -> Self {
        Self {
            creator_private_key: PrivateKey::new(creator_private_key),
            invite_base_url,
            env,
        }
    }

    /// The raw 32-byte creator private key, for passing into `convos-invite`
    /// and `convos-crypto` calls that need it by value.
    pub fn creator_private_key(&self) -> &[u8; 32] {
        self.creator_private_key.as_bytes()
    }

    /// Build a `Config` for `env`, resolving the creator private key from
    /// `XMTP_WALLET_KEY` (or the legacy `WALLET_KEY`).
    pub fn from_env(env: Environment, invite_base_url: Option<String>) -> Result<Self> {
        Ok(Self::new(private_key_from_env()?, env, invite_base_url))
    }

    /// The invite base URL to use: the explicit override if set, else the
    /// environment's default (§4.5 URL generation).
    pub fn base_url(&self) -> &str {
        self.invite_base_url
            .as_deref()
            .unwrap_or_else(|| self.env.default_base_url())
    }
}

/// Resolve the creator's private key from `XMTP_WALLET_KEY`, falling back
/// to the legacy `WALLET_KEY`. Accepts hex with or without a `0x` prefix.
fn private_key_from_env() -> Result<[u8; 32]> {
    let raw = std::env::var("XMTP_WALLET_KEY")
        .or_else(|_| std::env::var("WALLET_KEY"))
        .map_err(|_| MiddlewareError::MissingEnvVar("XMTP_WALLET_KEY or WALLET_KEY"))?;

    convos_crypto::hex::decode_fixed::<32>(&raw)
        .map_err(|e| MiddlewareError::InvalidPrivateKey(e.to_string()))
}
