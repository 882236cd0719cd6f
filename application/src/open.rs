//! Open Action (4.6.1): five fixed vendor control-endpoint reads that
//! nudge the device into its working mode, followed by a firmware
//! version read. Any step failing aborts the whole action with the
//! underlying error — there is no partial-success state to recover
//! from.

use crate::context::DeviceContext;
use sdcp_core::SdcpError;
use sdcp_transport::port::{ControlIn, ControlRequestType};
use tracing::{debug, info};

/// The device's reported firmware version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareVersion(pub String);

/// Run the five-step init sequence and read back the firmware version.
/// Unlocks the device for every other action.
pub async fn open(ctx: &DeviceContext) -> Result<FirmwareVersion, SdcpError> {
    let timeout = ctx.variant.endpoints.control_timeout;

    for (label, request) in init_sequence() {
        debug!(label, "DEV_INIT_CONTROL");
        ctx.port.control_in(request, timeout).await.map_err(|e| {
            debug!(label, error = %e, "DEV_INIT_CONTROL failed");
            SdcpError::Proto("device init control transfer failed")
        })?;
    }

    let response = ctx.transport.exec(Some(&ctx.adapter.fw_version), true).await.map_err(|e| {
        debug!(error = %e, "DEV_GET_FW_VERSION failed");
        SdcpError::Proto("firmware version read failed")
    })?;

    let version = parse_firmware_version(&response, &ctx.adapter.fw_version_suffix)?;
    info!(version = %version.0, "device opened");
    Ok(version)
}

/// The fixed five-step control-transfer sequence, each a
/// device-to-host ("IN") read with no payload.
fn init_sequence() -> [(&'static str, ControlIn); 5] {
    [
        (
            "DEV_INIT_CONTROL1",
            ControlIn {
                request_type: ControlRequestType::Vendor,
                request: 32,
                value: 0x0000,
                index: 4,
                length: 16,
            },
        ),
        (
            "DEV_INIT_CONTROL2",
            ControlIn {
                request_type: ControlRequestType::Vendor,
                request: 32,
                value: 0x0000,
                index: 4,
                length: 40,
            },
        ),
        (
            "DEV_INIT_CONTROL3",
            ControlIn {
                request_type: ControlRequestType::Standard,
                request: 0,
                value: 0x0000,
                index: 0,
                length: 2,
            },
        ),
        (
            "DEV_INIT_CONTROL4",
            ControlIn {
                request_type: ControlRequestType::Standard,
                request: 0,
                value: 0x0000,
                index: 0,
                length: 2,
            },
        ),
        (
            "DEV_INIT_CONTROL5",
            ControlIn {
                request_type: ControlRequestType::Vendor,
                request: 82,
                value: 0x0000,
                index: 0,
                length: 8,
            },
        ),
    ]
}

/// Recover the version string from a firmware-version response: skip
/// the read prefix, the two check bytes, three fixed `0x00` bytes and a
/// carriage return, then take everything but the trailing suffix.
fn parse_firmware_version(buf: &[u8], suffix: &[u8]) -> Result<FirmwareVersion, SdcpError> {
    use sdcp_transport::framing::READ_PREFIX;

    const CHECK_BYTES_LEN: usize = 2;
    const FIXED_ZEROES_LEN: usize = 3;
    const CARRIAGE_RETURN_LEN: usize = 1;
    let skip = READ_PREFIX.len() + CHECK_BYTES_LEN + FIXED_ZEROES_LEN + CARRIAGE_RETURN_LEN;

    if buf.len() < skip + suffix.len() {
        return Err(SdcpError::Proto("firmware version response truncated"));
    }
    if &buf[buf.len() - suffix.len()..] != suffix {
        return Err(SdcpError::Proto("firmware version response missing trailing suffix"));
    }

    let version_bytes = &buf[skip..buf.len() - suffix.len()];
    Ok(FirmwareVersion(String::from_utf8_lossy(version_bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_string_between_fixed_header_and_suffix() {
        let mut buf = sdcp_transport::framing::READ_PREFIX.to_vec();
        buf.extend_from_slice(&[0x00, 0x00]); // check bytes
        buf.extend_from_slice(&[0x00, 0x00, 0x00]); // fixed zeroes
        buf.push(0x0d); // carriage return
        buf.extend_from_slice(b"1.02");
        buf.extend_from_slice(b"FW_END");

        let version = parse_firmware_version(&buf, b"FW_END").unwrap();
        assert_eq!(version.0, "1.02");
    }

    #[test]
    fn rejects_response_missing_the_expected_suffix() {
        let mut buf = sdcp_transport::framing::READ_PREFIX.to_vec();
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x0d]);
        buf.extend_from_slice(b"1.02NOPE");

        assert!(parse_firmware_version(&buf, b"FW_END").is_err());
    }
}
