//! The `UsbPort` trait: the narrow surface Action FSMs need from a USB
//! device, and the `nusb`-backed implementation of it.
//!
//! Grounded on the `nusb` bulk/interrupt transfer pattern (timeout via
//! `tokio::time::timeout`, fixed-size `RequestBuffer` reads).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a `UsbPort` implementation can raise.
#[derive(Debug, Error)]
pub enum PortError {
    /// The underlying USB stack reported a failure.
    #[error("usb i/o error: {0}")]
    Usb(String),
    /// The transfer did not complete within its deadline.
    #[error("usb transfer timed out")]
    Timeout,
}

/// Which `bmRequestType` request-type bits a control transfer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequestType {
    /// A USB-standard request (`GET_DESCRIPTOR` and friends).
    Standard,
    /// A vendor-defined request.
    Vendor,
}

/// A device-to-host ("IN") USB control-transfer request, used by the
/// Open Action's five-step init sequence (`DEV_INIT_CONTROL_1..5`).
#[derive(Debug, Clone, Copy)]
pub struct ControlIn {
    /// `bmRequestType`'s request-type field.
    pub request_type: ControlRequestType,
    /// `bRequest`.
    pub request: u8,
    /// `wValue`.
    pub value: u16,
    /// `wIndex`.
    pub index: u16,
    /// `wLength`: how many bytes to read.
    pub length: u16,
}

/// The narrow asynchronous USB surface the transport layer and Action
/// FSMs depend on. Implemented by the real `nusb` backend in this
/// crate and by the in-memory `mock` backend used in tests.
#[async_trait]
pub trait UsbPort: Send + Sync {
    /// Issue a bulk OUT transfer, waiting up to `timeout`.
    async fn bulk_out(&self, data: Vec<u8>, timeout: Duration) -> Result<(), PortError>;

    /// Issue a bulk IN transfer of up to `max_len` bytes, waiting up to
    /// `timeout`.
    async fn bulk_in(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, PortError>;

    /// Issue an interrupt IN transfer of up to `max_len` bytes, waiting
    /// up to `timeout`. Short reads are expected here and are not an
    /// error (the Finger-presence FSM interprets a short buffer
    /// itself).
    async fn interrupt_in(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, PortError>;

    /// Issue a device-to-host control transfer, waiting up to `timeout`.
    async fn control_in(&self, request: ControlIn, timeout: Duration) -> Result<Vec<u8>, PortError>;
}

/// The real `nusb`-backed implementation, bound to one claimed
/// interface on one bulk OUT/IN endpoint pair and one interrupt IN
/// endpoint.
pub struct NusbPort {
    interface: nusb::Interface,
    bulk_out_endpoint: u8,
    bulk_in_endpoint: u8,
    interrupt_in_endpoint: u8,
}

impl NusbPort {
    /// Wrap an already-claimed `nusb::Interface` and its endpoint
    /// numbers.
    pub fn new(
        interface: nusb::Interface,
        bulk_out_endpoint: u8,
        bulk_in_endpoint: u8,
        interrupt_in_endpoint: u8,
    ) -> Self {
        Self {
            interface,
            bulk_out_endpoint,
            bulk_in_endpoint,
            interrupt_in_endpoint,
        }
    }
}

#[async_trait]
impl UsbPort for NusbPort {
    async fn bulk_out(&self, data: Vec<u8>, timeout: Duration) -> Result<(), PortError> {
        let transfer = self.interface.bulk_out(self.bulk_out_endpoint, data);
        let completion = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| PortError::Timeout)?;
        completion.into_result().map_err(|e| PortError::Usb(e.to_string()))?;
        Ok(())
    }

    async fn bulk_in(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, PortError> {
        let transfer = self
            .interface
            .bulk_in(self.bulk_in_endpoint, nusb::transfer::RequestBuffer::new(max_len));
        let completion = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| PortError::Timeout)?;
        completion.into_result().map_err(|e| PortError::Usb(e.to_string()))
    }

    async fn interrupt_in(&self, max_len: usize, timeout: Duration) -> Result<Vec<u8>, PortError> {
        let transfer = self.interface.interrupt_in(
            self.interrupt_in_endpoint,
            nusb::transfer::RequestBuffer::new(max_len),
        );
        let completion = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| PortError::Timeout)?;
        completion.into_result().map_err(|e| PortError::Usb(e.to_string()))
    }

    async fn control_in(&self, request: ControlIn, timeout: Duration) -> Result<Vec<u8>, PortError> {
        let control = nusb::transfer::Control {
            control_type: match request.request_type {
                ControlRequestType::Standard => nusb::transfer::ControlType::Standard,
                ControlRequestType::Vendor => nusb::transfer::ControlType::Vendor,
            },
            recipient: nusb::transfer::Recipient::Device,
            request: request.request,
            value: request.value,
            index: request.index,
        };
        let transfer = self
            .interface
            .control_in(control, nusb::transfer::RequestBuffer::new(request.length as usize));
        let completion = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| PortError::Timeout)?;
        completion.into_result().map_err(|e| PortError::Usb(e.to_string()))
    }
}
