//! Host key generation and P-256 ECDH key agreement.

use crate::memory::GuardedKey32;
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand_core::OsRng;

/// Errors raised while generating or using the host key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EcdhError {
    /// The peer-supplied public key was not a valid P-256 point.
    #[error("peer public key is not a valid P-256 point")]
    InvalidPeerKey,
}

/// The host's ephemeral-per-session P-256 key pair.
///
/// The private scalar is the only secret here and is held in a
/// zeroizing guard; the public point is not sensitive.
pub struct HostKeyPair {
    private: GuardedKey32,
    /// Uncompressed SEC1 point: `0x04 || X(32) || Y(32)`.
    public_uncompressed: [u8; 65],
}

impl HostKeyPair {
    /// Generate a fresh host key pair using the OS RNG.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        Self::from_secret(secret)
    }

    /// Reconstruct a host key pair from a persisted 32-byte private
    /// scalar (as loaded from the Claim Store).
    pub fn from_private_bytes(private: [u8; 32]) -> Result<Self, EcdhError> {
        let secret = SecretKey::from_slice(&private).map_err(|_| EcdhError::InvalidPeerKey)?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let encoded = secret.public_key().to_encoded_point(false);
        let mut public_uncompressed = [0u8; 65];
        public_uncompressed.copy_from_slice(encoded.as_bytes());

        let mut private = GuardedKey32::zeroed();
        private.borrow_mut().copy_from_slice(secret.to_bytes().as_slice());

        Self {
            private,
            public_uncompressed,
        }
    }

    /// The 65-byte uncompressed SEC1 point, as persisted in the claim file.
    pub fn public_key_65(&self) -> [u8; 65] {
        self.public_uncompressed
    }

    /// The 64-byte raw `X || Y` form used on the wire (no SEC1 prefix).
    pub fn public_key_raw64(&self) -> [u8; 64] {
        let mut raw = [0u8; 64];
        raw.copy_from_slice(&self.public_uncompressed[1..]);
        raw
    }

    /// The raw 32-byte private scalar, for persistence only.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        *self.private.borrow()
    }

    /// `Z = ECDH(host_private, peer_pk).x`, the shared secret's
    /// x-coordinate, given the peer's raw 64-byte `X || Y` point.
    pub fn shared_x(&self, peer_pk_raw64: &[u8; 64]) -> Result<GuardedKey32, EcdhError> {
        let peer_pub = decode_raw64(peer_pk_raw64)?;
        let secret = SecretKey::from_slice(self.private.borrow())
            .map_err(|_| EcdhError::InvalidPeerKey)?;
        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer_pub.as_affine());

        let mut z = GuardedKey32::zeroed();
        z.borrow_mut().copy_from_slice(shared.raw_secret_bytes());
        Ok(z)
    }
}

/// Decode a device-supplied raw `X || Y` (64 B) point into a [`PublicKey`].
pub fn decode_raw64(raw64: &[u8; 64]) -> Result<PublicKey, EcdhError> {
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..].copy_from_slice(raw64);
    PublicKey::from_sec1_bytes(&sec1).map_err(|_| EcdhError::InvalidPeerKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_x_agrees_between_two_parties() {
        let host = HostKeyPair::generate();
        let device = HostKeyPair::generate();

        let z_host = host.shared_x(&device.public_key_raw64()).expect("host side");
        let z_device = device.shared_x(&host.public_key_raw64()).expect("device side");

        assert_eq!(z_host.borrow(), z_device.borrow());
    }

    #[test]
    fn independent_key_pairs_yield_different_public_keys() {
        let a = HostKeyPair::generate();
        let b = HostKeyPair::generate();
        assert_ne!(a.public_key_raw64(), b.public_key_raw64());
    }
}
