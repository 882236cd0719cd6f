//! HMAC-SHA256 message builders for SDCP's connect / reconnect /
//! identify / enroll MACs, plus the shared constant-time comparison.

use crate::memory::GuardedKey32;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

fn keyed_mac(k_app: &GuardedKey32, parts: &[&[u8]]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(k_app.borrow()).expect("hmac accepts a key of any length");
    for part in parts {
        mac.update(part);
    }
    let out = mac.finalize().into_bytes();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&out);
    buf
}

/// `m = HMAC(K_app, "connect" || r_h || r_d || pk_host || pk_d || pk_f || h_f)`.
pub fn connect_mac(
    k_app: &GuardedKey32,
    r_h: &[u8; 32],
    r_d: &[u8; 32],
    host_public_key: &[u8; 64],
    pk_d: &[u8; 64],
    pk_f: &[u8; 64],
    h_f: &[u8; 32],
) -> [u8; 32] {
    keyed_mac(
        k_app,
        &[b"connect", r_h, r_d, host_public_key, pk_d, pk_f, h_f],
    )
}

/// `m_rec = HMAC(K_app, "reconnect" || r_d')`.
pub fn reconnect_mac(k_app: &GuardedKey32, r_d_prime: &[u8; 32]) -> [u8; 32] {
    keyed_mac(k_app, &[b"reconnect", r_d_prime])
}

/// `m_id = HMAC(K_app, "identify" || r_h_id || enrollment_id)`.
pub fn identify_mac(k_app: &GuardedKey32, r_h_id: &[u8; 32], enrollment_id: &[u8; 32]) -> [u8; 32] {
    keyed_mac(k_app, &[b"identify", r_h_id, enrollment_id])
}

/// `enrollment_id = HMAC(K_app, "enroll" || n_e)`.
pub fn enrollment_id(k_app: &GuardedKey32, n_e: &[u8; 32]) -> [u8; 32] {
    keyed_mac(k_app, &[b"enroll", n_e])
}

/// Constant-time byte equality. All MAC comparisons in the SDCP Session
/// must go through this rather than `==`.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Marker re-exported for callers that want the concrete HMAC-SHA256
/// type without constructing it through the builders above.
pub type Hmac256 = Hmac<Sha256>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> GuardedKey32 {
        let mut k = GuardedKey32::zeroed();
        k.borrow_mut().copy_from_slice(&[0x42u8; 32]);
        k
    }

    #[test]
    fn identify_mac_matches_and_rejects_bit_flips() {
        let k_app = key();
        let nonce = [0u8; 32];
        let id = [0x07u8; 32];
        let mac = identify_mac(&k_app, &nonce, &id);

        assert!(ct_eq(&mac, &identify_mac(&k_app, &nonce, &id)));

        let mut flipped_id = id;
        flipped_id[0] ^= 0x01;
        assert!(!ct_eq(&mac, &identify_mac(&k_app, &nonce, &flipped_id)));

        let mut flipped_mac = mac;
        flipped_mac[0] ^= 0x01;
        assert!(!ct_eq(&mac, &flipped_mac));
    }

    #[test]
    fn enrollment_id_is_hmac_enroll_nonce() {
        let k_app = key();
        let nonce = [0x09u8; 32];
        assert_eq!(enrollment_id(&k_app, &nonce), keyed_mac(&k_app, &[b"enroll", &nonce]));
    }
}
