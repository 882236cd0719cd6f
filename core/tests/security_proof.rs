//! Integration coverage for the Secure Core's full lifecycle: a
//! reconnected session's MACs and enrollment-id derivation match an
//! independently computed HMAC, and a saved claim survives a round
//! trip through the Claim Store exactly as it was snapshotted.

use hmac::{Hmac, Mac};
use sdcp_core::claim::ClaimStore;
use sdcp_core::session::SdcpSession;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn hmac(key: &[u8; 32], label: &[u8], msg: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac accepts any key length");
    mac.update(label);
    for part in msg {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

fn live_session(supports_reconnect: bool) -> SdcpSession {
    SdcpSession::from_live_claim(
        [0x11u8; 32],
        [0x22u8; 32],
        [0x33u8; 32],
        [0x44u8; 32],
        1_700_000_000,
        supports_reconnect,
        86_400,
    )
    .expect("well-formed live-claim material reconstructs")
}

#[test]
fn reconnect_accepts_an_independently_computed_mac() {
    let mut session = live_session(true);
    let r_d_prime = [0x55u8; 32];
    let mac = hmac(&[0x44u8; 32], b"reconnect", &[&r_d_prime]);

    assert!(session.verify_reconnect(&r_d_prime, &mac));
    assert!(session.is_connected());
}

#[test]
fn reconnect_rejects_a_tampered_mac() {
    let mut session = live_session(true);
    let r_d_prime = [0x55u8; 32];
    let mut mac = hmac(&[0x44u8; 32], b"reconnect", &[&r_d_prime]);
    mac[0] ^= 0xFF;

    assert!(!session.verify_reconnect(&r_d_prime, &mac));
}

#[test]
fn authorized_identity_matches_an_independently_computed_mac() {
    let session = live_session(false);
    let host_nonce = [0x00u8; 32];
    let enrollment_id = [0x66u8; 32];
    let mac = hmac(&[0x44u8; 32], b"identify", &[&host_nonce, &enrollment_id]);

    assert!(session.verify_authorized_identity(&host_nonce, &enrollment_id, &mac));
}

#[test]
fn enrollment_id_matches_an_independently_computed_mac() {
    let session = live_session(false);
    let device_nonce = [0x77u8; 32];
    let expected = hmac(&[0x44u8; 32], b"enroll", &[&device_nonce]);

    assert_eq!(session.generate_enrollment_id(&device_nonce).unwrap(), expected);
}

#[test]
fn claim_round_trips_through_the_store_unchanged() {
    let session = live_session(true);
    let material = session.snapshot_for_claim().expect("connected session snapshots");

    let dir = std::env::temp_dir().join(format!(
        "sdcp-core-security-proof-{:?}",
        std::thread::current().id()
    ));
    let store = ClaimStore::new(&dir, "SN-SECURITY-PROOF");
    store.save(&material).expect("save succeeds");

    let loaded = store
        .load_if_live(86_400)
        .expect("load succeeds")
        .expect("claim is still live");

    assert_eq!(loaded.master_secret, material.master_secret);
    assert_eq!(loaded.application_secret, material.application_secret);
    assert_eq!(loaded.application_symmetric_key, material.application_symmetric_key);
    assert_eq!(loaded.host_public_key, material.host_public_key);
    assert_eq!(loaded.host_private_key, material.host_private_key);
    assert!(loaded.supports_reconnect);

    let _ = std::fs::remove_dir_all(&dir);
}
