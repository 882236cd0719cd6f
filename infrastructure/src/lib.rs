//! SDCP Infrastructure Layer.
//!
//! Device Adapter constant tables and device-family variants. This
//! crate is pure data: it never touches key material or a live
//! transport.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod record;
pub mod variant;

pub use adapter::DeviceAdapter;
pub use record::StoredFingerprint;
pub use variant::{CheckPrefixFamily, DeviceVariant};
