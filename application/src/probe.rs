//! Probe Action (2(added)): the precursor to Open. Finds the device's
//! serial number and the enrollment-stage count its driver data
//! advertises, before any `DeviceContext` (and therefore any
//! Device Adapter selection) exists.
//!
//! Grounded on the open/reset/claim-interface/read-serial sequence
//! common to `nusb`-backed drivers in this lineage; probing never
//! issues vendor commands, only USB device-level operations.

use sdcp_core::SdcpError;
use std::time::Duration;
use tracing::{debug, info};

/// What Probe discovers about a device before it is opened for real
/// work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// The device's serial number, or a fixed placeholder when running
    /// under `FP_DEVICE_EMULATION`.
    pub serial: String,
    /// The enrollment-stage count this device's driver data advertises
    /// (20, 15, or the family default).
    pub max_enroll_stages: u8,
}

const EMULATED_SERIAL: &str = "emulated-device";
const STAGES_20_BIT: u32 = 0x01;
const STAGES_15_BIT: u32 = 0x02;

/// Open `device_info`, reset it, claim interface 0, read its serial
/// (or substitute the emulation placeholder), derive its enrollment
/// stage count from `driver_data`'s feature bits, then release the
/// interface and close the device.
pub async fn probe(device_info: &nusb::DeviceInfo, driver_data: u32) -> Result<ProbeResult, SdcpError> {
    let device = device_info
        .open()
        .map_err(|e| proto_from_usb("could not open device", e))?;

    debug!("resetting device");
    device.reset().map_err(|e| proto_from_usb("device reset failed", e))?;
    tokio::time::sleep(RESET_SETTLE).await;

    let interface = device
        .detach_and_claim_interface(0)
        .map_err(|e| proto_from_usb("could not claim control interface", e))?;

    let serial = read_serial(device_info);
    let max_enroll_stages = stages_from_driver_data(driver_data);

    drop(interface);
    drop(device);

    info!(serial = %serial, max_enroll_stages, "probed device");
    Ok(ProbeResult { serial, max_enroll_stages })
}

/// `FP_DEVICE_EMULATION=1` substitutes a fixed serial, for running the
/// driver against the mock transport without a physical sensor
/// attached.
fn read_serial(device_info: &nusb::DeviceInfo) -> String {
    if std::env::var("FP_DEVICE_EMULATION").as_deref() == Ok("1") {
        return EMULATED_SERIAL.to_string();
    }
    device_info
        .serial_number()
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown-serial".to_string())
}

/// `max_enroll_stages` from the device's driver-data feature bits.
/// The authoritative bit positions live in the excluded USB VID/PID
/// table; these are illustrative placeholders exercising the same
/// three-way (20/15/default) branch the real table selects from.
fn stages_from_driver_data(driver_data: u32) -> u8 {
    if driver_data & STAGES_20_BIT != 0 {
        20
    } else if driver_data & STAGES_15_BIT != 0 {
        15
    } else {
        sdcp_infrastructure::DEFAULT_MAX_ENROLL_STAGES
    }
}

fn proto_from_usb(context: &'static str, err: impl std::fmt::Display) -> SdcpError {
    debug!(error = %err, "probe step failed");
    SdcpError::Proto(context)
}

/// A short settle delay some device families need between reset and
/// claiming the interface.
const RESET_SETTLE: Duration = Duration::from_millis(50);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_data_selects_twenty_stages() {
        assert_eq!(stages_from_driver_data(STAGES_20_BIT), 20);
    }

    #[test]
    fn driver_data_selects_fifteen_stages() {
        assert_eq!(stages_from_driver_data(STAGES_15_BIT), 15);
    }

    #[test]
    fn driver_data_falls_back_to_default_stages() {
        assert_eq!(stages_from_driver_data(0), sdcp_infrastructure::DEFAULT_MAX_ENROLL_STAGES);
    }
}
