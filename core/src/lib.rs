#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(warnings)]
#![deny(clippy::all)]
#![deny(unsafe_code)]

//! SDCP Secure Core.
//!
//! Cryptographic trust anchor for the driver: host-key generation, key
//! agreement with the sensor, attestation verification, session-secret
//! derivation, Authorized-Identity and reconnect MACs, enrollment-id
//! generation, and the persisted-claim lifecycle. No USB I/O, no
//! framing, no progress reporting — those live in the transport and
//! application crates.

pub mod crypto;
pub mod memory;
pub mod error;
pub mod session;
pub mod claim;

pub use error::SdcpError;
