//! Finger-presence FSM (4.3): polls the interrupt-IN endpoint until the
//! device reports a finger is on the sensor, or until timeout or
//! cancellation.

use crate::framing::READ_PREFIX;
use crate::port::{PortError, UsbPort};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::debug;

/// The two states of the Finger-presence FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerState {
    /// No finger detected on the most recent poll.
    NotOnSensor,
    /// A finger was detected; the wait is complete.
    OnSensor,
}

/// Errors the Finger-presence FSM can raise.
#[derive(Debug, Error)]
pub enum FingerError {
    /// The underlying port failed.
    #[error("transport i/o failure: {0}")]
    Io(#[from] PortError),
    /// No finger was detected within the configured timeout.
    #[error("timed out waiting for finger presence")]
    Timeout,
    /// The wait was cancelled via its dedicated cancellation handle.
    #[error("finger-presence wait was cancelled")]
    Cancelled,
}

/// A cancellation handle distinct from the overall action's
/// cancellation, so a caller can interrupt a finger-presence wait
/// without tearing down the surrounding action or session. Hand-rolled
/// rather than pulling in `tokio-util` for a single `CancellationToken`
/// use site.
#[derive(Clone)]
pub struct FingerCancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl FingerCancelHandle {
    /// Create a fresh, not-yet-cancelled handle.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Signal cancellation; any in-progress `wait` returns
    /// `FingerError::Cancelled` promptly.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Whether this handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Reset the handle so a subsequent wait can proceed — used by the
    /// `cancel` action, which must interrupt the current wait and
    /// leave the scope usable for the next one.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

impl Default for FingerCancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls the interrupt-IN endpoint for finger presence.
pub struct FingerPresenceFsm {
    port: Arc<dyn UsbPort>,
    finger_present_suffix: Vec<u8>,
    poll_max_len: usize,
    poll_timeout: Duration,
    wait_timeout: Duration,
}

impl FingerPresenceFsm {
    /// Build a Finger-presence FSM over `port`. `finger_present_suffix`
    /// is the device's fixed trailing byte pattern for "finger on
    /// sensor" responses, from the Device Adapter.
    pub fn new(
        port: Arc<dyn UsbPort>,
        finger_present_suffix: Vec<u8>,
        poll_max_len: usize,
        poll_timeout: Duration,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            port,
            finger_present_suffix,
            poll_max_len,
            poll_timeout,
            wait_timeout,
        }
    }

    /// Poll until a finger is detected, the wait timeout elapses, or
    /// `cancel` is signalled.
    pub async fn wait(&self, cancel: &FingerCancelHandle) -> Result<FingerState, FingerError> {
        let start = Instant::now();

        loop {
            if cancel.is_cancelled() {
                return Err(FingerError::Cancelled);
            }
            if start.elapsed() >= self.wait_timeout {
                return Err(FingerError::Timeout);
            }

            let poll = self.port.interrupt_in(self.poll_max_len, self.poll_timeout);
            let notified = cancel_notified(cancel);

            tokio::select! {
                result = poll => {
                    let buffer = result?;
                    if self.is_finger_present(&buffer) {
                        debug!("ON_SENSOR");
                        return Ok(FingerState::OnSensor);
                    }
                    debug!("NOT_ON_SENSOR");
                }
                _ = notified => {
                    return Err(FingerError::Cancelled);
                }
            }
        }
    }

    fn is_finger_present(&self, buffer: &[u8]) -> bool {
        buffer.len() >= READ_PREFIX.len()
            && &buffer[..READ_PREFIX.len()] == READ_PREFIX
            && buffer.ends_with(self.finger_present_suffix.as_slice())
    }
}

fn cancel_notified(cancel: &FingerCancelHandle) -> impl std::future::Future<Output = ()> + '_ {
    cancel.notify.notified()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockUsbPort;
    use std::time::Duration;

    #[tokio::test]
    async fn detects_finger_on_matching_response() {
        let mock = Arc::new(MockUsbPort::new());
        mock.push_interrupt_in({
            let mut buf = READ_PREFIX.to_vec();
            buf.extend_from_slice(b"HAS_FINGER");
            buf
        });

        let fsm = FingerPresenceFsm::new(
            mock,
            b"HAS_FINGER".to_vec(),
            64,
            Duration::from_millis(50),
            Duration::from_secs(1),
        );
        let cancel = FingerCancelHandle::new();
        assert_eq!(fsm.wait(&cancel).await.unwrap(), FingerState::OnSensor);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let mock = Arc::new(MockUsbPort::new());
        for _ in 0..100 {
            mock.push_interrupt_in(b"SIGE".to_vec());
        }

        let fsm = FingerPresenceFsm::new(
            mock,
            b"HAS_FINGER".to_vec(),
            64,
            Duration::from_millis(10),
            Duration::from_secs(5),
        );
        let cancel = FingerCancelHandle::new();
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_clone.cancel();
        });

        let result = fsm.wait(&cancel).await;
        assert!(matches!(result, Err(FingerError::Cancelled)));
    }
}
