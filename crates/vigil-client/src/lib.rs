//! Authenticated liveness client for the watchtower registry.
//!
//! One invocation runs a strict three-step sequence: pre-login fetches a
//! challenge, login submits the signature over it, and status queries reuse
//! the session cookie set at login. [`Session`] can only be obtained from
//! [`SessionClient::establish`], so a query can never run before the
//! handshake has completed.

pub mod config;
pub mod session;
pub mod status;

pub use config::ClientConfig;
pub use session::{Session, SessionClient};
pub use status::StatusRecord;
