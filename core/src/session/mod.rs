//! The SDCP Session: the host side of connect, reconnect, authorized
//! identity, and enrollment-id generation. This is the security
//! boundary — every other component trusts only what this module
//! verifies.

mod connect;

pub use connect::ConnectResponse;
use connect::derive_keys_and_verify_connect_ex;

use crate::crypto::{self, HostKeyPair, TrustAnchor};
use crate::error::SdcpError;
use crate::memory::GuardedKey32;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Per-device SDCP session state (section 3's "Session state").
pub struct SdcpSession {
    host_key: HostKeyPair,
    host_random: [u8; 32],

    master_secret: Option<GuardedKey32>,
    application_secret: Option<GuardedKey32>,
    application_symmetric_key: Option<GuardedKey32>,

    is_connected: bool,
    connected_uptime: Option<Instant>,
    connected_realtime: Option<u64>,

    supports_reconnect: bool,
    claim_expiration_seconds: i64,
}

impl SdcpSession {
    /// Start a fresh, unconnected session for a device family with the
    /// given `supports_reconnect` and `claim_expiration_seconds`
    /// attributes, generating a new host key pair and host random.
    pub fn new(supports_reconnect: bool, claim_expiration_seconds: i64) -> Self {
        Self {
            host_key: HostKeyPair::generate(),
            host_random: crypto::generate_random(),
            master_secret: None,
            application_secret: None,
            application_symmetric_key: None,
            is_connected: false,
            connected_uptime: None,
            connected_realtime: None,
            supports_reconnect,
            claim_expiration_seconds,
        }
    }

    /// Reconstruct an already-connected session from a loaded, live
    /// claim. `connected_uptime` has no cross-process meaning (the
    /// monotonic clock resets per boot and the claim file does not
    /// persist it — only `connected_realtime` is persisted), so a
    /// fresh monotonic baseline is taken for this process.
    #[allow(clippy::too_many_arguments)]
    pub fn from_live_claim(
        host_private_key: [u8; 32],
        master_secret: [u8; 32],
        application_secret: [u8; 32],
        application_symmetric_key: [u8; 32],
        connected_realtime: u64,
        supports_reconnect: bool,
        claim_expiration_seconds: i64,
    ) -> Result<Self, SdcpError> {
        let host_key = HostKeyPair::from_private_bytes(host_private_key)
            .map_err(|_| SdcpError::DataInvalid("persisted host private key is invalid"))?;

        let mut ms = GuardedKey32::zeroed();
        ms.borrow_mut().copy_from_slice(&master_secret);
        let mut as_ = GuardedKey32::zeroed();
        as_.borrow_mut().copy_from_slice(&application_secret);
        let mut k_app = GuardedKey32::zeroed();
        k_app.borrow_mut().copy_from_slice(&application_symmetric_key);

        Ok(Self {
            host_key,
            host_random: crypto::generate_random(),
            master_secret: Some(ms),
            application_secret: Some(as_),
            application_symmetric_key: Some(k_app),
            is_connected: true,
            connected_uptime: Some(Instant::now()),
            connected_realtime: Some(connected_realtime),
            supports_reconnect,
            claim_expiration_seconds,
        })
    }

    /// Install a deterministic host key pair and host random, for tests
    /// that need reproducible session material.
    pub fn set_host_keys(&mut self, host_private_key: [u8; 32], host_random: [u8; 32]) -> Result<(), SdcpError> {
        if self.is_connected {
            return Err(SdcpError::General("cannot change host keys on a connected session"));
        }
        self.host_key = HostKeyPair::from_private_bytes(host_private_key)
            .map_err(|_| SdcpError::DataInvalid("host private key is invalid"))?;
        self.host_random = host_random;
        Ok(())
    }

    /// The host's random value for this session.
    pub fn host_random(&self) -> [u8; 32] {
        self.host_random
    }

    /// The host's public key in 64-byte raw `X || Y` wire form.
    pub fn host_public_key_raw64(&self) -> [u8; 64] {
        self.host_key.public_key_raw64()
    }

    /// The host's public key in 65-byte uncompressed SEC1 form, as
    /// persisted in the claim file.
    pub fn host_public_key_65(&self) -> [u8; 65] {
        self.host_key.public_key_65()
    }

    /// The host's raw 32-byte private scalar, for persistence only.
    pub fn host_private_key_bytes(&self) -> [u8; 32] {
        self.host_key.private_key_bytes()
    }

    /// Whether `connect` or `reconnect` has succeeded and not since
    /// expired or been invalidated.
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Wall-clock seconds recorded at the last successful connect or
    /// reconnect, if any.
    pub fn connected_realtime(&self) -> Option<u64> {
        self.connected_realtime
    }

    /// Whether this device family advertises reconnect support.
    pub fn supports_reconnect(&self) -> bool {
        self.supports_reconnect
    }

    /// This device family's claim TTL, in seconds.
    pub fn claim_expiration_seconds(&self) -> i64 {
        self.claim_expiration_seconds
    }

    /// Component-form connect (4.4.5): caller has already split the
    /// device's response into its fields.
    #[allow(clippy::too_many_arguments)]
    pub fn derive_keys_and_verify_connect_ex(
        &mut self,
        response: &ConnectResponse,
        trust_anchor: &TrustAnchor,
    ) -> Result<(), SdcpError> {
        let host_public = self.host_key.public_key_raw64();
        let host_random = self.host_random;
        let host_key = &self.host_key;

        let outcome = derive_keys_and_verify_connect_ex(
            &host_random,
            &host_public,
            |peer| {
                host_key
                    .shared_x(peer)
                    .map_err(|_| SdcpError::DataInvalid("device public key is invalid"))
            },
            response,
            trust_anchor,
        )?;

        self.master_secret = Some(outcome.master_secret);
        self.application_secret = Some(outcome.application_secret);
        self.application_symmetric_key = Some(outcome.application_symmetric_key);
        self.mark_connected_now();
        Ok(())
    }

    /// Buffer-form connect (4.4.5): self-parses the device's raw byte
    /// stream (including walking the DER certificate to find its own
    /// length) before running the same algorithm as the component-form
    /// entry point. Property 3 requires these to agree; this function
    /// is implemented entirely in terms of the component-form one so
    /// that holds by construction.
    pub fn derive_keys_and_verify_connect_buf(
        &mut self,
        buf: &[u8],
        trust_anchor: &TrustAnchor,
    ) -> Result<(), SdcpError> {
        let response = ConnectResponse::parse(buf)?;
        self.derive_keys_and_verify_connect_ex(&response, trust_anchor)
    }

    fn mark_connected_now(&mut self) {
        self.is_connected = true;
        self.connected_uptime = Some(Instant::now());
        self.connected_realtime = Some(unix_now());
    }

    /// Reconnect (4.4.2): only valid if this family supports it and a
    /// session is already connected. Verifies `m_rec` and, on success,
    /// refreshes `connected_uptime`/`connected_realtime` without
    /// deriving new keys. Also enforces that the host monotonic clock
    /// has not rewound past the `connected_uptime` recorded at the
    /// last connect/reconnect, per the claim-liveness invariant.
    pub fn verify_reconnect(&mut self, r_d_prime: &[u8; 32], mac: &[u8; 32]) -> bool {
        if !self.supports_reconnect {
            return false;
        }
        let Some(k_app) = &self.application_symmetric_key else {
            return false;
        };

        let expected = crypto::reconnect_mac(k_app, r_d_prime);
        if !crypto::ct_eq(&expected, mac) {
            return false;
        }

        let now = Instant::now();
        if let Some(previous) = self.connected_uptime {
            if now < previous {
                warn!("host monotonic clock rewound since last connect, rejecting reconnect");
                return false;
            }
        }

        self.connected_uptime = Some(now);
        self.connected_realtime = Some(unix_now());
        self.is_connected = true;
        true
    }

    /// Authorized-identity verification (4.4.3).
    pub fn verify_authorized_identity(
        &self,
        host_nonce: &[u8; 32],
        enrollment_id: &[u8; 32],
        mac: &[u8; 32],
    ) -> bool {
        let Some(k_app) = &self.application_symmetric_key else {
            return false;
        };
        let expected = crypto::identify_mac(k_app, host_nonce, enrollment_id);
        crypto::ct_eq(&expected, mac)
    }

    /// Enrollment identifier generation (4.4.4).
    pub fn generate_enrollment_id(&self, device_nonce: &[u8; 32]) -> Result<[u8; 32], SdcpError> {
        let k_app = self
            .application_symmetric_key
            .as_ref()
            .ok_or(SdcpError::General("session is not connected"))?;
        Ok(crypto::enrollment_id(k_app, device_nonce))
    }

    /// Snapshot the session secrets for persistence by the Claim Store.
    /// Returns `None` if the session is not connected.
    pub fn snapshot_for_claim(&self) -> Option<ClaimMaterial> {
        let ms = self.master_secret.as_ref()?.borrow();
        let as_ = self.application_secret.as_ref()?.borrow();
        let k_app = self.application_symmetric_key.as_ref()?.borrow();
        Some(ClaimMaterial {
            master_secret: *ms,
            application_secret: *as_,
            application_symmetric_key: *k_app,
            host_public_key: self.host_key.public_key_65(),
            host_private_key: self.host_key.private_key_bytes(),
            connected_realtime: self.connected_realtime?,
            supports_reconnect: self.supports_reconnect,
        })
    }

    /// Invalidate the session in memory (used when a crypto
    /// verification failure means the claim must be discarded).
    pub fn invalidate(&mut self) {
        self.is_connected = false;
        self.connected_uptime = None;
        self.connected_realtime = None;
        self.master_secret = None;
        self.application_secret = None;
        self.application_symmetric_key = None;
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The subset of session state the Claim Store persists, matching the
/// binary layout in section 6.
pub struct ClaimMaterial {
    pub master_secret: [u8; 32],
    pub application_secret: [u8; 32],
    pub application_symmetric_key: [u8; 32],
    pub host_public_key: [u8; 65],
    pub host_private_key: [u8; 32],
    pub connected_realtime: u64,
    pub supports_reconnect: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_id_requires_connection() {
        let session = SdcpSession::new(false, 86400);
        assert!(session.generate_enrollment_id(&[0u8; 32]).is_err());
    }

    #[test]
    fn authorized_identity_fails_when_not_connected() {
        let session = SdcpSession::new(false, 86400);
        assert!(!session.verify_authorized_identity(&[0u8; 32], &[1u8; 32], &[2u8; 32]));
    }

    #[test]
    fn reconnect_rejected_when_family_does_not_support_it() {
        let mut session = SdcpSession::new(false, 86400);
        assert!(!session.verify_reconnect(&[0x11u8; 32], &[0u8; 32]));
    }
}
