//! Unified error type for vigil operations.
//!
//! Every failure in this workspace is fatal for the current invocation and is
//! returned to the caller verbatim; nothing is retried automatically. A
//! watchtower that has never authenticated is not an error — it is reported as
//! a status record with no liveness timestamp.

/// Unified error type for all vigil operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VigilError {
    /// Private key material could not be parsed or used
    #[error("key error: {message}")]
    Key {
        /// Description of the key problem
        message: String,
    },

    /// Network or connection failure while talking to the registry
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Response did not match the protocol contract, or login was refused
    #[error("protocol error: {message}")]
    Protocol {
        /// Description of the contract violation
        message: String,
    },

    /// A liveness timestamp was present but not valid RFC 3339
    #[error("timestamp parse error: {message}")]
    TimestampParse {
        /// Description of the malformed timestamp
        message: String,
    },
}

impl VigilError {
    /// Create a key error
    pub fn key(message: impl Into<String>) -> Self {
        Self::Key {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a timestamp parse error
    pub fn timestamp_parse(message: impl Into<String>) -> Self {
        Self::TimestampParse {
            message: message.into(),
        }
    }
}

/// Standard Result type for vigil operations
pub type VigilResult<T> = std::result::Result<T, VigilError>;
