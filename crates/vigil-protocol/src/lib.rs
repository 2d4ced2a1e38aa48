//! Wire protocol for the registry's challenge-response API.
//!
//! Three JSON-over-HTTPS endpoints: pre-login issues a challenge, login
//! accepts a signature over it, and the challenger endpoint answers status
//! queries. Every response arrives inside a `{"result": ...}` envelope.
//! Decoding tolerates unknown fields, so newer server versions keep working;
//! a missing `last_alive` decodes to `None` rather than an error.

use serde::{Deserialize, Serialize};

/// Geolocation claims submitted at pre-login.
///
/// The service currently accepts these without validation, so placeholder
/// values are fine. Callers that need real claims override the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoClaims {
    /// ISO country code
    pub country: String,
    /// City name
    pub city: String,
    /// Region or state name
    pub region: String,
    /// Latitude in degrees
    pub latitude: f32,
    /// Longitude in degrees
    pub longitude: f32,
    /// Claimed radius in meters
    pub radius: f32,
}

impl Default for GeoClaims {
    fn default() -> Self {
        Self {
            country: "IN".to_string(),
            city: "Bengaluru".to_string(),
            region: "Karnataka".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            radius: 1_000_000.0,
        }
    }
}

/// Wallet public keys attached to a pre-login request. Unused chains are sent
/// as empty strings, matching what the service expects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletPublicKey {
    /// Solana wallet address, if any
    pub solana: String,
    /// Ethereum wallet address, if any
    pub ethereum: String,
}

/// Body of `POST /pre-login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreLoginRequest {
    /// Address derived from the operator's signing key
    pub public_key: String,
    /// Key scheme descriptor, e.g. `"ethereum"`
    pub key_type: String,
    /// Role announced to the registry
    pub role: String,
    /// Project the login is scoped to
    pub project_name: String,
    /// Geolocation claims
    pub claims: GeoClaims,
    /// Wallet addresses associated with the operator
    pub wallet_public_key: WalletPublicKey,
    /// Version string of this client
    pub client_version: String,
}

/// Envelope every registry response arrives in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// The endpoint-specific payload
    pub result: T,
}

/// Payload of the pre-login response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResult {
    /// Opaque challenge to sign; consumed by exactly one login attempt
    pub message: String,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// `0x`-prefixed hex signature over the challenge
    pub signature: String,
}

/// Payload of the login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    /// Whether the registry accepted the signature
    pub success: bool,
}

/// Body of `POST /challenger` (status query).
#[derive(Debug, Clone, Serialize)]
pub struct StatusRequest {
    /// Fully-qualified watchtower identifier, e.g. `IPv4/1.2.3.4`
    pub id: String,
}

/// Payload of the status response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResult {
    /// Identifier echoed back by the service
    pub id: String,
    /// RFC 3339 instant of the watchtower's last successful login. Absent
    /// when it has never authenticated.
    #[serde(default)]
    pub last_alive: Option<String>,
}
