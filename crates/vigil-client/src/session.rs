//! Authenticated session establishment.
//!
//! The handshake is a strict two-step sequence: pre-login yields a challenge,
//! login submits the signature computed over that exact challenge. The service
//! sets a session cookie on successful login; every later request on the same
//! client echoes it. Any transport failure, malformed body, or refused login
//! is fatal for the invocation — there is no partial-success state and no
//! automatic retry.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use vigil_core::{Identity, VigilError, VigilResult};
use vigil_protocol::{
    ApiResponse, ChallengeResult, LoginRequest, LoginResult, PreLoginRequest, WalletPublicKey,
};

use crate::config::ClientConfig;

/// Key scheme descriptor; fixed by the signing convention in vigil-core.
const KEY_TYPE: &str = "ethereum";

/// Unauthenticated client. [`SessionClient::establish`] consumes it and
/// returns a [`Session`].
pub struct SessionClient {
    http: Client,
    config: ClientConfig,
}

impl SessionClient {
    /// Build the HTTP client with a cookie store and the configured timeout.
    pub fn new(config: ClientConfig) -> VigilResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| VigilError::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Run the pre-login/login handshake.
    ///
    /// Consuming `self` means a [`Session`] can only exist after a successful
    /// handshake, and every status query reuses the cookie jar the login
    /// populated.
    pub async fn establish(self, identity: &Identity) -> VigilResult<Session> {
        let challenge = self.pre_login(identity).await?;
        self.login(identity, &challenge).await?;
        debug!(address = %identity.address(), "session established");

        Ok(Session {
            http: self.http,
            config: self.config,
        })
    }

    /// Step 1: announce the identity and receive a single-use challenge.
    async fn pre_login(&self, identity: &Identity) -> VigilResult<String> {
        let address = identity.address().to_string();
        let body = PreLoginRequest {
            public_key: address.clone(),
            key_type: KEY_TYPE.to_string(),
            role: self.config.role.clone(),
            project_name: self.config.project_name.clone(),
            claims: self.config.claims.clone(),
            wallet_public_key: WalletPublicKey {
                solana: String::new(),
                ethereum: address,
            },
            client_version: self.config.client_version.clone(),
        };

        let url = self.config.endpoint(ClientConfig::PRE_LOGIN_PATH);
        let response: ApiResponse<ChallengeResult> = post_json(&self.http, &url, &body).await?;
        Ok(response.result.message)
    }

    /// Step 2: submit the signature over the challenge just received.
    async fn login(&self, identity: &Identity, challenge: &str) -> VigilResult<()> {
        let body = LoginRequest {
            signature: identity.sign(challenge)?,
        };

        let url = self.config.endpoint(ClientConfig::LOGIN_PATH);
        let response: ApiResponse<LoginResult> = post_json(&self.http, &url, &body).await?;
        if !response.result.success {
            return Err(VigilError::protocol("login rejected by the registry"));
        }
        Ok(())
    }
}

/// Authenticated session. Holds the cookie-carrying HTTP client for the rest
/// of the invocation; dropped when the caller is done. The status query
/// engine lives on this type (see [`crate::status`]).
#[derive(Debug)]
pub struct Session {
    pub(crate) http: Client,
    pub(crate) config: ClientConfig,
}

/// POST a JSON body and decode the enveloped JSON response.
pub(crate) async fn post_json<B, T>(http: &Client, url: &str, body: &B) -> VigilResult<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| VigilError::transport(format!("POST {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(VigilError::protocol(format!(
            "{} returned status {}",
            url, status
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| VigilError::protocol(format!("malformed response from {}: {}", url, e)))
}
