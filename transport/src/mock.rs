//! An in-memory `UsbPort` double for tests and the CLI demo, standing
//! in for the real OS/`nusb` transport when no physical sensor is
//! available.

use crate::port::{ControlIn, PortError, UsbPort};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A scripted `UsbPort`: queued bulk-in and interrupt-in responses are
/// returned in FIFO order; bulk-out writes and control-in requests are
/// recorded for assertions.
pub struct MockUsbPort {
    bulk_in_queue: Mutex<Vec<Vec<u8>>>,
    interrupt_in_queue: Mutex<Vec<Vec<u8>>>,
    bulk_out_log: Mutex<Vec<Vec<u8>>>,
    control_in_queue: Mutex<Vec<Vec<u8>>>,
    control_in_log: Mutex<Vec<(u8, u16, u16, u16)>>,
}

impl MockUsbPort {
    /// An empty mock with no scripted responses.
    pub fn new() -> Self {
        Self {
            bulk_in_queue: Mutex::new(Vec::new()),
            interrupt_in_queue: Mutex::new(Vec::new()),
            bulk_out_log: Mutex::new(Vec::new()),
            control_in_queue: Mutex::new(Vec::new()),
            control_in_log: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response the next `bulk_in` call will return.
    pub fn push_bulk_in(&self, response: Vec<u8>) {
        self.bulk_in_queue.lock().expect("mock mutex poisoned").push(response);
    }

    /// Queue a response the next `interrupt_in` call will return.
    pub fn push_interrupt_in(&self, response: Vec<u8>) {
        self.interrupt_in_queue
            .lock()
            .expect("mock mutex poisoned")
            .push(response);
    }

    /// Queue a response the next `control_in` call will return.
    pub fn push_control_in(&self, response: Vec<u8>) {
        self.control_in_queue.lock().expect("mock mutex poisoned").push(response);
    }

    /// Every buffer previously sent via `bulk_out`, in order.
    pub fn sent_bulk_out(&self) -> Vec<Vec<u8>> {
        self.bulk_out_log.lock().expect("mock mutex poisoned").clone()
    }

    /// Every `(request, value, index, length)` previously issued via
    /// `control_in`, in order.
    pub fn sent_control_in(&self) -> Vec<(u8, u16, u16, u16)> {
        self.control_in_log.lock().expect("mock mutex poisoned").clone()
    }
}

impl Default for MockUsbPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsbPort for MockUsbPort {
    async fn bulk_out(&self, data: Vec<u8>, _timeout: Duration) -> Result<(), PortError> {
        self.bulk_out_log.lock().expect("mock mutex poisoned").push(data);
        Ok(())
    }

    async fn bulk_in(&self, _max_len: usize, _timeout: Duration) -> Result<Vec<u8>, PortError> {
        let mut queue = self.bulk_in_queue.lock().expect("mock mutex poisoned");
        if queue.is_empty() {
            return Err(PortError::Usb("mock bulk_in queue exhausted".into()));
        }
        Ok(queue.remove(0))
    }

    async fn interrupt_in(&self, _max_len: usize, _timeout: Duration) -> Result<Vec<u8>, PortError> {
        let mut queue = self.interrupt_in_queue.lock().expect("mock mutex poisoned");
        if queue.is_empty() {
            return Err(PortError::Usb("mock interrupt_in queue exhausted".into()));
        }
        Ok(queue.remove(0))
    }

    async fn control_in(&self, request: ControlIn, _timeout: Duration) -> Result<Vec<u8>, PortError> {
        self.control_in_log.lock().expect("mock mutex poisoned").push((
            request.request,
            request.value,
            request.index,
            request.length,
        ));

        let mut queue = self.control_in_queue.lock().expect("mock mutex poisoned");
        if queue.is_empty() {
            return Ok(vec![0u8; request.length as usize]);
        }
        Ok(queue.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bulk_in_returns_queued_responses_in_order() {
        let mock = MockUsbPort::new();
        mock.push_bulk_in(vec![1, 2, 3]);
        mock.push_bulk_in(vec![4, 5, 6]);

        let first = mock.bulk_in(64, Duration::from_millis(10)).await.unwrap();
        assert_eq!(first, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn interrupt_in_returns_queued_responses_fifo() {
        let mock = MockUsbPort::new();
        mock.push_interrupt_in(vec![1]);
        mock.push_interrupt_in(vec![2]);

        assert_eq!(mock.interrupt_in(64, Duration::from_millis(10)).await.unwrap(), vec![1]);
        assert_eq!(mock.interrupt_in(64, Duration::from_millis(10)).await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn bulk_out_is_recorded() {
        let mock = MockUsbPort::new();
        mock.bulk_out(vec![0xAA], Duration::from_millis(10)).await.unwrap();
        assert_eq!(mock.sent_bulk_out(), vec![vec![0xAA]]);
    }
}
