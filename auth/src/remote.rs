//! Remote strategy: delegate verification to the identity-owning service.
//!
//! The dependent service holds no signing secret. It forwards the bearer token
//! unchanged to the owner's verification endpoint and trusts the returned
//! [`AuthOutcome`]. Every call goes over the network; nothing is remembered
//! between requests.
//!
//! Cancellation: the request future is owned by the inbound request's task, so
//! when the caller goes away the outbound call is dropped with it.
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use tracing::{debug, error};
use url::Url;

use crate::error::AuthError;
use crate::middleware::TOKEN_HEADER;
use crate::outcome::{AuthOutcome, AuthStatus, PROTOCOL_HEADER, PROTOCOL_VERSION};
use crate::resolver::{IdentityResolver, token_fingerprint};
use crate::subject::SubjectId;

/// Default bound on one verification round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Anything that prevents a well-formed `AuthOutcome` from coming back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("verification request timed out")]
    Timeout,
    #[error("verification request failed: {0}")]
    Request(reqwest::Error),
    #[error("verification endpoint answered {0}")]
    Status(StatusCode),
    #[error("verification response has no auth-protocol header")]
    MissingProtocolVersion,
    #[error("unsupported auth protocol version {0:?}")]
    ProtocolVersion(String),
    #[error("undecodable verification response: {0}")]
    Decode(reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Decode(e)
        } else {
            TransportError::Request(e)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteConfigError {
    #[error("invalid verification endpoint url: {0}")]
    InvalidUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct RemoteVerifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl RemoteVerifier {
    /// `endpoint` is the absolute URL of the owner's verification route,
    /// e.g. `http://customers:3000/api/v1/auth`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RemoteConfigError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| RemoteConfigError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoteConfigError::InvalidUrl(endpoint.to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One round trip to the verification endpoint.
    pub async fn verify(&self, token: &str) -> Result<AuthOutcome, TransportError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        // Every reply must say which protocol it speaks.
        let version = response
            .headers()
            .get(PROTOCOL_HEADER)
            .ok_or(TransportError::MissingProtocolVersion)?;
        let advertised = version.to_str().ok().and_then(|v| v.trim().parse::<u8>().ok());
        if advertised != Some(PROTOCOL_VERSION) {
            return Err(TransportError::ProtocolVersion(
                String::from_utf8_lossy(version.as_bytes()).into_owned(),
            ));
        }

        Ok(response.json::<AuthOutcome>().await?)
    }
}

#[async_trait]
impl IdentityResolver for RemoteVerifier {
    async fn resolve(&self, token: &str) -> Result<SubjectId, AuthError> {
        let outcome = self.verify(token).await.map_err(|e| {
            error!(
                endpoint = %self.endpoint,
                token_fp = %token_fingerprint(token),
                error = %e,
                "remote token verification failed"
            );
            AuthError::VerifierTransportFailure
        })?;

        debug!(status = ?outcome.status, "remote verification outcome");

        match outcome.status {
            AuthStatus::Ok => SubjectId::new(outcome.id).ok_or_else(|| {
                error!(
                    endpoint = %self.endpoint,
                    id = outcome.id,
                    "remote verifier returned a negative subject id"
                );
                AuthError::VerifierTransportFailure
            }),
            AuthStatus::NotFound => Err(AuthError::SubjectNotFound),
            AuthStatus::Invalid => Err(AuthError::InvalidSignatureOrExpiry),
            AuthStatus::MissingToken => Err(AuthError::MissingToken),
        }
    }
}
