//! Unpadded URL-safe base64 (§4.1).
//!
//! Used to frame invite slugs and `app_data` metadata. The decoder tolerates
//! missing padding since every encoder in this workspace omits it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::{CryptoError, Result};

/// Encode bytes as unpadded URL-safe base64 (`-`/`_`, no `=`).
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded (or padded) URL-safe base64.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    // Strip any padding a caller might have included; URL_SAFE_NO_PAD
    // rejects it outright, so normalize first.
    let trimmed = input.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_arbitrary_bytes() {
        for data in [&b""[..], b"a", b"ab", b"abc", b"\x00\x01\x02\xff"] {
            assert_eq!(decode(&encode(data)).expect("decode"), data);
        }
    }

    #[test]
    fn uses_url_safe_alphabet() {
        // Bytes chosen so the standard alphabet would emit '+' and '/'.
        let data = [0xfb, 0xff, 0xbf];
        let encoded = encode(&data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn decode_tolerates_padding() {
        let data = b"pad me";
        let padded = format!("{}==", encode(data));
        assert_eq!(decode(&padded).expect("decode"), data);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not base64!!").is_err());
    }
}
