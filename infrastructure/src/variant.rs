//! Device-family variants: the per-SKU constants a collaborator
//! selects once a device has been probed. The USB VID/PID → variant
//! lookup itself stays out of scope; only the variant's shape and one
//! illustrative default live here.

use std::time::Duration;

/// Which of the two known check-byte prefix families a device speaks
/// for its `CHECK` command (4.6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPrefixFamily {
    /// `check_prefix_type1`.
    Type1,
    /// `check_prefix_type2`.
    Type2,
}

/// Endpoint numbers and per-transfer timeouts for one device family.
#[derive(Debug, Clone, Copy)]
pub struct Endpoints {
    /// Bulk OUT endpoint address for commands.
    pub bulk_out: u8,
    /// Bulk IN endpoint address for responses.
    pub bulk_in: u8,
    /// Interrupt IN endpoint address for finger-presence notifications.
    pub interrupt_in: u8,
    /// Control transfer timeout.
    pub control_timeout: Duration,
    /// Bulk send timeout.
    pub bulk_send_timeout: Duration,
    /// Bulk receive timeout.
    pub bulk_receive_timeout: Duration,
    /// Interrupt read timeout (per poll, not per wait).
    pub interrupt_timeout: Duration,
    /// Overall finger-detection wait timeout.
    pub finger_detection_timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            bulk_out: 0x01,
            bulk_in: 0x81,
            interrupt_in: 0x82,
            control_timeout: Duration::from_millis(2000),
            bulk_send_timeout: Duration::from_millis(2000),
            bulk_receive_timeout: Duration::from_millis(2000),
            interrupt_timeout: Duration::from_millis(500),
            finger_detection_timeout: Duration::from_secs(30),
        }
    }
}

/// A device family's fixed attributes, constructed by a collaborator
/// after probing a device and consulting the (out-of-scope) USB
/// VID/PID table.
#[derive(Debug, Clone)]
pub struct DeviceVariant {
    /// Human-readable family name, for logging.
    pub name: &'static str,
    /// Which check-prefix family this device speaks.
    pub check_prefix_family: CheckPrefixFamily,
    /// Maximum capture stages for one enrollment (15, 20, or a
    /// driver-default).
    pub max_enroll_stages: u8,
    /// Maximum number of live enrollments the device will hold,
    /// independent of `max_enroll_stages`
    /// (`EGISMOC_MAX_ENROLL_NUM`-equivalent).
    pub max_enroll_count: u8,
    /// Whether this family's firmware supports the reconnect fast
    /// path (4.4.2). Defaults to `false` for real device families; set
    /// `true` only for test/virtual variants.
    pub supports_reconnect: bool,
    /// Seconds a persisted claim remains usable without re-running
    /// connect.
    pub claim_expiration_seconds: i64,
    /// Endpoint numbers and per-transfer timeouts.
    pub endpoints: Endpoints,
}

/// The default enrollment-stage count used when a family's exact stage
/// count is not one of the two known classes (15 or 20).
pub const DEFAULT_MAX_ENROLL_STAGES: u8 = 10;

impl DeviceVariant {
    /// An illustrative default variant (TYPE1, 15 stages, reconnect
    /// disabled, one-day claim TTL) used by the CLI demo and as a
    /// baseline for tests that don't care about family specifics.
    pub fn illustrative_default() -> Self {
        Self {
            name: "sdcp-generic",
            check_prefix_family: CheckPrefixFamily::Type1,
            max_enroll_stages: 15,
            max_enroll_count: 10,
            supports_reconnect: false,
            claim_expiration_seconds: 86_400,
            endpoints: Endpoints::default(),
        }
    }

    /// A variant with reconnect enabled, for exercising 4.4.2 and
    /// scenario S6 — no real device family in this driver's lineage
    /// advertises this, but the state machine must still be correct
    /// for the firmware that does.
    pub fn reconnect_capable_test_variant() -> Self {
        Self {
            name: "sdcp-test-reconnect",
            supports_reconnect: true,
            ..Self::illustrative_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illustrative_default_disables_reconnect() {
        assert!(!DeviceVariant::illustrative_default().supports_reconnect);
    }

    #[test]
    fn test_variant_enables_reconnect() {
        assert!(DeviceVariant::reconnect_capable_test_variant().supports_reconnect);
    }
}
