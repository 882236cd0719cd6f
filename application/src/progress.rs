//! The progress-reporting seam. The actual user-visible progress API is
//! an excluded collaborator (1. Non-goals); this trait is the narrow
//! interface an Action FSM calls into, so a caller can plug in
//! whatever progress UI it likes without this crate depending on it.

/// One emitted progress event from a running Action FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    /// Enrollment advanced by one capture stage; `stage` is 1-based,
    /// `of` is the family's `max_enroll_stages`.
    EnrollStageComplete { stage: u8, of: u8 },
    /// A capture attempt failed for a retryable reason.
    EnrollCaptureRetry(RetryReason),
    /// Identify/verify found a match.
    IdentifyMatched,
    /// Identify/verify found no match.
    IdentifyNotMatched,
    /// Waiting for a finger to be placed on the sensor.
    WaitingForFinger,
}

/// Why a single capture attempt was retried during enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The finger was off-center.
    OffCenter,
    /// The sensor surface appears dirty.
    DirtySensor,
    /// An otherwise unclassified capture failure.
    Unknown,
}

/// Receives progress events from a running Action FSM. Implemented by
/// whatever collaborator owns user-visible reporting; this crate never
/// assumes a concrete sink.
pub trait ProgressSink: Send + Sync {
    /// Called once per emitted event, in order.
    fn on_event(&self, event: ActionEvent);
}

/// A `ProgressSink` that discards every event, for callers that only
/// want the final result.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ActionEvent) {}
}
