//! Lowercase, no-prefix hex codec (§4.1).
//!
//! Thin wrapper over the `hex` crate so call sites never import it directly
//! and every hex string produced by this workspace is lowercase.

use crate::{CryptoError, Result};

/// Encode bytes as lowercase hex with no `0x` prefix.
pub fn encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string. Requires even length; accepts an optional `0x`
/// prefix for caller convenience (e.g. `XMTP_WALLET_KEY`).
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    if trimmed.len() % 2 != 0 {
        return Err(CryptoError::InvalidInput(
            "hex string must have even length".to_string(),
        ));
    }
    hex::decode(trimmed).map_err(|e| CryptoError::InvalidInput(e.to_string()))
}

/// Decode a hex string into an exact fixed-size array.
pub fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N]> {
    let bytes = decode(input)?;
    if bytes.len() != N {
        return Err(CryptoError::InvalidKeyLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
