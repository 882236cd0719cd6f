//! Transport FSM (4.2): one `CMD_SEND` (optional) then one `CMD_GET`
//! per `exec` call, over a `UsbPort`.

use crate::framing::{build_request, READ_PREFIX};
use crate::port::{PortError, UsbPort};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors the Transport FSM can raise, mapped 1:1 onto
/// `sdcp_core::error::SdcpError`'s transport-facing kinds by callers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying port failed.
    #[error("transport i/o failure: {0}")]
    Io(#[from] PortError),
    /// A short read was received where `short_is_error` required a
    /// full-length response.
    #[error("protocol violation: short read")]
    ShortRead,
    /// A second `exec` was attempted while one was already in flight.
    #[error("protocol violation: transport fsm re-entered while a transfer was in flight")]
    ReEntered,
}

/// Drives one request/response exchange at a time over a `UsbPort`.
/// Only one `exec` may be in flight per device; a second concurrent
/// call is a programmer error in the Action FSM layer and is reported
/// as `TransportError::ReEntered` rather than silently interleaved.
pub struct TransportFsm {
    port: Arc<dyn UsbPort>,
    read_len: usize,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl TransportFsm {
    /// Build a Transport FSM over `port`, reading up to `read_len`
    /// bytes per response and bounding every transfer by `timeout`.
    pub fn new(port: Arc<dyn UsbPort>, read_len: usize, timeout: Duration) -> Self {
        Self {
            port,
            read_len,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one request/response exchange: if `payload` is `Some`,
    /// frame and send it (`CMD_SEND`), then always receive one
    /// response (`CMD_GET`). If `short_is_error` is set, a response
    /// shorter than `READ_PREFIX.len()` is a protocol violation rather
    /// than returned as-is.
    pub async fn exec(&self, payload: Option<&[u8]>, short_is_error: bool) -> Result<Vec<u8>, TransportError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(TransportError::ReEntered);
        }
        let result = self.exec_inner(payload, short_is_error).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn exec_inner(&self, payload: Option<&[u8]>, short_is_error: bool) -> Result<Vec<u8>, TransportError> {
        if let Some(payload) = payload {
            let framed = build_request(payload);
            debug!(len = framed.len(), "CMD_SEND");
            self.port.bulk_out(framed, self.timeout).await?;
        }

        debug!("CMD_GET");
        let response = self.port.bulk_in(self.read_len, self.timeout).await?;

        if short_is_error && response.len() < READ_PREFIX.len() {
            warn!(len = response.len(), "short read treated as protocol error");
            return Err(TransportError::ShortRead);
        }

        Ok(response)
    }
}
