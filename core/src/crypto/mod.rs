//! Stateless SDCP cryptography primitives.
//!
//! NO key storage, NO lifecycle, NO state — everything here is a pure
//! function over caller-supplied key material. `sdcp_core::session` is
//! the only module allowed to hold the outputs for longer than a call.

#![deny(clippy::derive_debug)]

pub mod cert;
pub mod ecdh;
pub mod ecdsa;
pub mod hkdf_chain;
pub mod mac;
pub mod rand;

pub use cert::{cert_encoded_len, verify_chain, CertError, ModelCertificate, TrustAnchor};
pub use ecdh::{EcdhError, HostKeyPair};
pub use ecdsa::{verify_signature, SignatureError};
pub use hkdf_chain::{derive_application_secret, derive_master_secret, derive_symmetric_key, HkdfError};
pub use mac::{connect_mac, ct_eq, enrollment_id, identify_mac, reconnect_mac, Hmac256};
pub use rand::generate_random;
