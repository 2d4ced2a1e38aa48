//! Client configuration.
//!
//! Service URL, role and project descriptors, geolocation claims, and the
//! per-call timeout are all constructor parameters; the protocol code never
//! reads a literal.

use std::time::Duration;

use vigil_protocol::GeoClaims;

/// Per-call timeout applied to every registry request. Expiry is reported as
/// a transport error.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one registry client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the registry API, e.g. `https://api.witnesschain.com`
    pub base_url: String,
    /// Role announced at pre-login
    pub role: String,
    /// Project the login is scoped to
    pub project_name: String,
    /// Client version string reported to the service
    pub client_version: String,
    /// Geolocation claims; the service accepts placeholders unvalidated
    pub claims: GeoClaims,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Path of the challenge-issuing endpoint.
    pub const PRE_LOGIN_PATH: &'static str = "/proof/v1/pol/pre-login";
    /// Path of the signature-submission endpoint.
    pub const LOGIN_PATH: &'static str = "/proof/v1/pol/login";
    /// Path of the status-query endpoint.
    pub const CHALLENGER_PATH: &'static str = "/proof/v1/pol/challenger";

    /// Configuration with the defaults the registry expects from operator
    /// tooling. Only the base URL is required.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            role: "prover".to_string(),
            project_name: "witness".to_string(),
            client_version: "99999999999".to_string(),
            claims: GeoClaims::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Full URL for an endpoint path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let config = ClientConfig::new("https://registry.example.com");
        assert_eq!(
            config.endpoint(ClientConfig::PRE_LOGIN_PATH),
            "https://registry.example.com/proof/v1/pol/pre-login"
        );
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ClientConfig::new("https://registry.example.com/");
        assert_eq!(
            config.endpoint(ClientConfig::LOGIN_PATH),
            "https://registry.example.com/proof/v1/pol/login"
        );
    }
}
