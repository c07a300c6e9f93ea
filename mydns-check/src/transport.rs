//! Pluggable HTTP transport for the login request.

use crate::config::CheckConfig;
use crate::credential::Credential;
use crate::error::CheckError;
use crate::http;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one authenticated GET.
///
/// Implementations must not retain the credential. All implementations must
/// be `Send + Sync` so one transport can be shared by every check.
pub trait Transport: Send + Sync {
    /// GET `url` with HTTP Basic authentication built from `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] when no response could be obtained:
    /// connection failure, timeout, or an unreadable body. Non-2xx statuses
    /// are not errors here.
    fn get_with_basic_auth(
        &self,
        url: &str,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<TransportResponse, CheckError>> + Send;
}

/// [`Transport`] backed by a long-lived [`reqwest::Client`].
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] if the config is invalid or the client cannot
    /// be constructed.
    pub fn new(config: &CheckConfig) -> Result<Self, CheckError> {
        Ok(Self {
            client: http::build_client(config)?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get_with_basic_auth(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<TransportResponse, CheckError> {
        let response = self
            .client
            .get(url)
            .basic_auth(credential.principal(), Some(credential.secret()))
            .send()
            .await
            .map_err(|e| CheckError::Http(format!("login request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CheckError::Http(format!("login response read failed: {e}")))?;

        tracing::debug!(status, bytes = body.len(), "login response received");
        Ok(TransportResponse { status, body })
    }
}
