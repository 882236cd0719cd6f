//! Shared per-device context an Action FSM is constructed over:
//! transport, finger-presence polling, the Device Adapter's constants,
//! and the SDCP Session/Claim Store.

use sdcp_core::claim::ClaimStore;
use sdcp_core::crypto::TrustAnchor;
use sdcp_core::session::SdcpSession;
use sdcp_infrastructure::{DeviceAdapter, DeviceVariant};
use sdcp_transport::finger::FingerCancelHandle;
use sdcp_transport::{FingerPresenceFsm, TransportFsm, UsbPort};
use std::sync::Arc;

/// Everything an Action FSM needs to drive one device: I/O, constants,
/// and the cryptographic session/claim state.
pub struct DeviceContext {
    /// The raw port, for the control-transfer calls the Open action
    /// issues directly (the Transport FSM only frames bulk transfers).
    pub port: Arc<dyn UsbPort>,
    /// One request/response exchange at a time.
    pub transport: TransportFsm,
    /// Polls for finger presence.
    pub finger: FingerPresenceFsm,
    /// The action-wide cancellation handle (tears down the whole FSM).
    pub action_cancel: FingerCancelHandle,
    /// The finger-wait-only cancellation handle (4.3's dedicated scope).
    pub finger_cancel: FingerCancelHandle,
    /// Vendor command/response constants for this device variant.
    pub adapter: DeviceAdapter,
    /// Per-family attributes (stage counts, reconnect support, TTL).
    pub variant: DeviceVariant,
    /// The SDCP Session: key agreement, MACs, enrollment ids.
    pub session: SdcpSession,
    /// The persisted claim for this device.
    pub claim_store: ClaimStore,
    /// The SDCP model trust anchor used to verify `cert_m`.
    pub trust_anchor: TrustAnchor,
}

impl DeviceContext {
    /// Build a fresh context: a new (unconnected) session, and the
    /// cancellation scopes `cancel`/`suspend` operate on.
    pub fn new(
        port: Arc<dyn UsbPort>,
        adapter: DeviceAdapter,
        variant: DeviceVariant,
        claim_store: ClaimStore,
        trust_anchor: TrustAnchor,
    ) -> Self {
        let endpoints = variant.endpoints;
        let transport = TransportFsm::new(port.clone(), 512, endpoints.bulk_receive_timeout);
        let finger = FingerPresenceFsm::new(
            port.clone(),
            adapter.sensor_has_finger_suffix.clone(),
            64,
            endpoints.interrupt_timeout,
            endpoints.finger_detection_timeout,
        );

        Self {
            port,
            transport,
            finger,
            action_cancel: FingerCancelHandle::new(),
            finger_cancel: FingerCancelHandle::new(),
            adapter,
            session: SdcpSession::new(variant.supports_reconnect, variant.claim_expiration_seconds),
            claim_store,
            trust_anchor,
            variant,
        }
    }

    /// `cancel` (2(added)): abort the finger-wait cancellation scope
    /// and recreate it so a subsequent wait can proceed.
    pub fn cancel(&mut self) {
        self.finger_cancel.cancel();
        self.finger_cancel = FingerCancelHandle::new();
    }

    /// `suspend` (2(added)): cancel both scopes without clearing the
    /// claim. The device should be idle unless an action is actually
    /// in flight.
    pub fn suspend(&mut self) {
        self.action_cancel.cancel();
        self.finger_cancel.cancel();
    }
}
