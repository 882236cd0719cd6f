//! SDCP's HKDF-SHA256 derivation chain: `Z -> MS -> AS -> K_app`.
//!
//! The label set (`"application"`, `"symmetric"`) is fixed by SDCP and
//! must not be changed by a compliant implementation.

use crate::memory::GuardedKey32;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Errors during HKDF expansion (only reachable for output lengths the
/// RFC forbids; 32 B is always valid for SHA-256, so this is infallible
/// in practice but kept explicit rather than panicking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HkdfError {
    /// `HKDF-Expand` refused to produce the requested output.
    #[error("hkdf expansion failed")]
    Expand,
}

/// `MS = HKDF-Extract(salt = r_h || r_d, ikm = Z)`.
///
/// `HKDF-Extract` is exactly `HMAC-SHA256(salt, ikm)` per RFC 5869, so
/// this is computed directly rather than through the `hkdf` crate's
/// combined extract-then-ready-to-expand API, so that `MS` itself can
/// be recovered and used as the PRK for the next step.
pub fn derive_master_secret(r_h: &[u8; 32], r_d: &[u8; 32], z: &GuardedKey32) -> GuardedKey32 {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(r_h);
    salt[32..].copy_from_slice(r_d);

    let mut mac =
        Hmac::<Sha256>::new_from_slice(&salt).expect("hmac accepts a key of any length");
    mac.update(z.borrow());
    let prk = mac.finalize().into_bytes();

    let mut ms = GuardedKey32::zeroed();
    ms.borrow_mut().copy_from_slice(&prk);
    ms
}

/// `AS = HKDF-Expand(MS, "application", 32)`.
pub fn derive_application_secret(ms: &GuardedKey32) -> Result<GuardedKey32, HkdfError> {
    expand_from_prk(ms, b"application")
}

/// `K_app = HKDF-Expand(AS, "symmetric", 32)`.
pub fn derive_symmetric_key(application_secret: &GuardedKey32) -> Result<GuardedKey32, HkdfError> {
    expand_from_prk(application_secret, b"symmetric")
}

fn expand_from_prk(prk: &GuardedKey32, label: &[u8]) -> Result<GuardedKey32, HkdfError> {
    let hk = Hkdf::<Sha256>::from_prk(prk.borrow()).map_err(|_| HkdfError::Expand)?;
    let mut out = GuardedKey32::zeroed();
    hk.expand(label, out.borrow_mut()).map_err(|_| HkdfError::Expand)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_deterministic() {
        let r_h = [0x11u8; 32];
        let r_d = [0x22u8; 32];
        let mut z = GuardedKey32::zeroed();
        z.borrow_mut().copy_from_slice(&[0x33u8; 32]);

        let ms_a = derive_master_secret(&r_h, &r_d, &z);
        let ms_b = derive_master_secret(&r_h, &r_d, &z);
        assert_eq!(ms_a.borrow(), ms_b.borrow());

        let as_a = derive_application_secret(&ms_a).expect("expand");
        let kapp_a = derive_symmetric_key(&as_a).expect("expand");
        assert_ne!(as_a.borrow(), kapp_a.borrow());
    }
}
