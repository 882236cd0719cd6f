//! SDCP Transport Layer.
//!
//! Framing, the Transport FSM, and the Finger-presence FSM. This crate
//! moves framed bytes across USB bulk/interrupt endpoints and never
//! sees key material — that trust boundary is what lets `sdcp_core`
//! stay the only crate with access to session secrets.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(unsafe_code)]

pub mod finger;
pub mod framing;
pub mod fsm;
pub mod mock;
pub mod port;

pub use finger::{FingerError, FingerPresenceFsm, FingerState};
pub use framing::{build_request, classify_response, FramingError, Match};
pub use fsm::{TransportError, TransportFsm};
pub use port::{ControlIn, ControlRequestType, NusbPort, PortError, UsbPort};
