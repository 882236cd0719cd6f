//! ECDSA-P256 signature verification for SDCP attestation.

use crate::crypto::ecdh::{decode_raw64, EcdhError};
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};

/// Errors raised while verifying an attestation signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signer's public key was not a valid P-256 point.
    #[error("signer public key is not a valid P-256 point")]
    InvalidKey,
    /// The 64-byte raw signature was malformed.
    #[error("signature encoding is invalid")]
    InvalidSignature,
    /// The signature did not verify against the message.
    #[error("signature did not verify")]
    Mismatch,
}

impl From<EcdhError> for SignatureError {
    fn from(_: EcdhError) -> Self {
        SignatureError::InvalidKey
    }
}

/// Verify a raw 64-byte `r || s` ECDSA-P256 signature against a raw
/// 64-byte `X || Y` public key, using SDCP's hash-then-sign convention
/// (SHA-256 over `message`).
pub fn verify_raw64(
    pubkey_raw64: &[u8; 64],
    message: &[u8],
    signature_raw64: &[u8; 64],
) -> Result<(), SignatureError> {
    let key = decode_raw64(pubkey_raw64)?;
    verify_with_key(&VerifyingKey::from(key), message, signature_raw64)
}

/// Verify a raw 64-byte `r || s` ECDSA-P256 signature against an
/// already-parsed [`VerifyingKey`] (e.g. one recovered from a model
/// certificate's subject public key).
pub fn verify_with_key(
    key: &VerifyingKey,
    message: &[u8],
    signature_raw64: &[u8; 64],
) -> Result<(), SignatureError> {
    let sig = Signature::from_slice(signature_raw64).map_err(|_| SignatureError::InvalidSignature)?;
    key.verify(message, &sig).map_err(|_| SignatureError::Mismatch)
}

/// Verify a caller-supplied signature, for callers that already hold
/// both operands; alias kept for readability at call sites.
pub fn verify_signature(
    pubkey_raw64: &[u8; 64],
    message: &[u8],
    signature_raw64: &[u8; 64],
) -> Result<(), SignatureError> {
    verify_raw64(pubkey_raw64, message, signature_raw64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecdh::HostKeyPair;
    use p256::ecdsa::{signature::Signer, SigningKey};

    #[test]
    fn round_trip_signs_and_verifies() {
        let pair = HostKeyPair::generate();
        let signing_key = SigningKey::from_slice(&pair.private_key_bytes()).expect("scalar");
        let message = b"pk_d || pk_f || h_f";
        let sig: Signature = signing_key.sign(message);
        let mut raw = [0u8; 64];
        raw.copy_from_slice(&sig.to_bytes());

        verify_raw64(&pair.public_key_raw64(), message, &raw).expect("verifies");
    }

    #[test]
    fn bit_flip_in_signature_fails() {
        let pair = HostKeyPair::generate();
        let signing_key = SigningKey::from_slice(&pair.private_key_bytes()).expect("scalar");
        let sig: Signature = signing_key.sign(b"msg");
        let mut raw = [0u8; 64];
        raw.copy_from_slice(&sig.to_bytes());
        raw[0] ^= 0x01;

        assert!(verify_raw64(&pair.public_key_raw64(), b"msg", &raw).is_err());
    }
}
