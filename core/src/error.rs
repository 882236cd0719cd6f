//! Shared error type for the whole workspace.
//!
//! TRUST LEVEL: Secure Core
//!
//! Every crate above `sdcp_core` reports failures through this type
//! rather than inventing a parallel enum, so the kinds in one place
//! (section 7 of the design) match exactly what callers observe.

/// Every error kind an Action FSM, the SDCP Session, or the Claim Store
/// can surface upward.
#[derive(Debug, thiserror::Error)]
pub enum SdcpError {
    /// The underlying transport failed (USB I/O error).
    #[error("transport i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A transfer did not complete within its deadline.
    #[error("operation timed out")]
    Timeout,

    /// A response frame or FSM state was not what was expected.
    #[error("protocol violation: {0}")]
    Proto(&'static str),

    /// A cryptographic check failed, or a response was malformed.
    #[error("data invalid: {0}")]
    DataInvalid(&'static str),

    /// Enrollment storage is at capacity.
    #[error("enrollment storage is full")]
    DataFull,

    /// No enrollments exist where at least one was required.
    #[error("no enrollments found")]
    DataNotFound,

    /// The fingerprint is already enrolled.
    #[error("fingerprint is already enrolled")]
    DataDuplicate,

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// An error that does not fit a more specific kind.
    #[error("{0}")]
    General(&'static str),
}
