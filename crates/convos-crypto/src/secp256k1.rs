//! secp256k1 ECDSA with public-key recovery (§4.1).
//!
//! The invite protocol signs over the SHA-256 hash of the encoded
//! `InvitePayload` and recovers the creator's public key from the signature
//! alone — the signature carries its own identity proof, so no separate
//! public-key field travels with it.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::{CryptoError, Result};

/// Compact signature length: 32-byte r, 32-byte s, 1-byte recovery id.
pub const SIGNATURE_LENGTH: usize = 65;

/// Uncompressed SEC1 public key length (0x04 prefix + 32-byte x + 32-byte y).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Sign a 32-byte message hash with a secp256k1 private key.
///
/// Returns `r ‖ s ‖ v` where `v` is the recovery id in `0..=3` and `(r, s)`
/// is normalized to low-s form.
pub fn sign_recoverable(message_hash: &[u8; 32], private_key: &[u8; 32]) -> Result<[u8; 65]> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash_recoverable(message_hash)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;

    let signature = signature.normalize_s().unwrap_or(signature);

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}

/// Recover the 65-byte uncompressed public key from a signature and the
/// message hash it was computed over.
///
/// Rejects signatures whose length is not 65 bytes or whose recovery byte
/// is greater than 3, per §4.1.
pub fn recover(message_hash: &[u8; 32], signature: &[u8]) -> Result<[u8; 65]> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }
    let recovery_byte = signature[64];
    if recovery_byte > 3 {
        return Err(CryptoError::InvalidSignature(format!(
            "recovery byte {recovery_byte} out of range"
        )));
    }

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| CryptoError::InvalidSignature("bad recovery id".to_string()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| CryptoError::SignatureVerification)?;

    Ok(to_uncompressed(&verifying_key))
}

/// Derive the 65-byte uncompressed public key for a private key.
pub fn public_key(private_key: &[u8; 32]) -> Result<[u8; 65]> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    Ok(to_uncompressed(signing_key.verifying_key()))
}

/// Normalize any valid secp256k1 public key encoding (33-byte compressed or
/// 65-byte uncompressed) to the 65-byte uncompressed form. Any other length
/// fails.
pub fn normalize_to_uncompressed(public_key: &[u8]) -> Result<[u8; 65]> {
    if public_key.len() != 33 && public_key.len() != 65 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 65,
            actual: public_key.len(),
        });
    }
    let point = k256::EncodedPoint::from_bytes(public_key)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    let verifying_key = VerifyingKey::from_encoded_point(&point)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    Ok(to_uncompressed(&verifying_key))
}

fn to_uncompressed(key: &VerifyingKey) -> [u8; 65] {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priv_key(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn sign_and_recover_roundtrip() {
        let sk = priv_key(0x01);
        let hash = crate::sha256::hash(b"hello invite");
        let sig = sign_recoverable(&hash, &sk).expect("sign");
        let recovered = recover(&hash, &sig).expect("recover");
        let expected = public_key(&sk).expect("public key");
        assert_eq!(recovered, expected);
    }

    #[test]
    fn recover_rejects_short_signature() {
        let hash = crate::sha256::hash(b"x");
        let err = recover(&hash, &[0u8; 64]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)));
    }

    #[test]
    fn recover_rejects_bad_recovery_byte() {
        let hash = crate::sha256::hash(b"x");
        let mut sig = [0u8; 65];
        sig[64] = 4;
        let err = recover(&hash, &sig).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)));
    }

    #[test]
    fn tampered_hash_recovers_different_key() {
        let sk = priv_key(0x02);
        let hash = crate::sha256::hash(b"original");
        let sig = sign_recoverable(&hash, &sk).expect("sign");
        let tampered_hash = crate::sha256::hash(b"tampered");
        let recovered = recover(&tampered_hash, &sig).expect("recover still succeeds");
        let expected = public_key(&sk).expect("public key");
        assert_ne!(recovered, expected);
    }

    #[test]
    fn normalize_compressed_and_uncompressed_agree() {
        let sk = priv_key(0x03);
        let signing_key = SigningKey::from_bytes((&sk).into()).expect("key");
        let uncompressed = to_uncompressed(signing_key.verifying_key());
        let compressed = signing_key.verifying_key().to_encoded_point(true);

        let from_compressed =
            normalize_to_uncompressed(compressed.as_bytes()).expect("normalize");
        assert_eq!(from_compressed, uncompressed);
    }

    #[test]
    fn normalize_rejects_bad_length() {
        let err = normalize_to_uncompressed(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }
}
