//! Core primitives for the vigil watchtower client.
//!
//! Provides the shared error taxonomy, the operator identity (secp256k1 key
//! material plus its derived registry address), and the challenge signer used
//! by the login handshake.

pub mod error;
pub mod identity;
pub mod signer;

pub use error::{VigilError, VigilResult};
pub use identity::{Address, Identity};
