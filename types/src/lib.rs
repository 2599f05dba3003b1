//! Core domain types for sleuth.
//!
//! This crate contains the payload types that travel through an unwind, with
//! no IO and minimal dependencies:
//!
//! - **`ThrownError`**: shared, identity-compared handle over a thrown error
//! - **`Scope`**: the module a throw or catch belongs to
//! - **`ThrownSignal`**: the tagged payload raised by a throw
//! - **`Unwind`**: classification of an intercepted payload into ours or a fault

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod error;
mod scope;
mod signal;
mod unwind;

pub use error::{MessageError, ThrownError};
pub use scope::Scope;
pub use signal::{CaptureMode, ThrownSignal};
pub use unwind::{Fault, FaultId, Unwind, payload_message};
