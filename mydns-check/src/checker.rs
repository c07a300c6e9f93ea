//! The synchronization check: one authenticated round trip reduced to a
//! [`SyncOutcome`].

use crate::credential::Credential;
use crate::marker;
use crate::outcome::{FailureReason, SyncOutcome};
use crate::transport::{ReqwestTransport, Transport};

/// Anything that can run a synchronization check.
///
/// Implemented by [`SyncChecker`]; callers that schedule checks are generic
/// over this trait so they can be driven by a stub in tests.
pub trait SyncCheck: Send + Sync {
    /// Run one check. Never fails: every problem maps to a [`FailureReason`].
    fn check(
        &self,
        credential: &Credential,
        login_endpoint: &str,
        success_pattern: &str,
    ) -> impl std::future::Future<Output = SyncOutcome> + Send;
}

/// Stateless checker over a shared [`Transport`].
#[derive(Debug, Clone)]
pub struct SyncChecker<T = ReqwestTransport> {
    transport: T,
}

impl<T: Transport> SyncChecker<T> {
    /// Create a checker that sends requests through `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `login_endpoint` with Basic auth and look for `success_pattern`.
    ///
    /// - transport failure → `Failure(TransportError)`
    /// - non-2xx status → `Failure(AuthRejected)`
    /// - 2xx without a body line equal to the pattern → `Failure(MarkerNotFound)`
    pub async fn check(
        &self,
        credential: &Credential,
        login_endpoint: &str,
        success_pattern: &str,
    ) -> SyncOutcome {
        tracing::debug!(endpoint = login_endpoint, "starting sync check");

        let response = match self
            .transport
            .get_with_basic_auth(login_endpoint, credential)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    endpoint = login_endpoint,
                    error = %e,
                    "sync check transport failure"
                );
                return SyncOutcome::Failure(FailureReason::TransportError);
            }
        };

        if !response.is_success() {
            tracing::warn!(
                endpoint = login_endpoint,
                status = response.status,
                "sync check rejected by provider"
            );
            return SyncOutcome::Failure(FailureReason::AuthRejected);
        }

        if marker::contains_success_marker(&response.body, success_pattern) {
            SyncOutcome::Success
        } else {
            tracing::warn!(
                endpoint = login_endpoint,
                bytes = response.body.len(),
                "success marker not found in provider response"
            );
            SyncOutcome::Failure(FailureReason::MarkerNotFound)
        }
    }
}

impl<T: Transport> SyncCheck for SyncChecker<T> {
    async fn check(
        &self,
        credential: &Credential,
        login_endpoint: &str,
        success_pattern: &str,
    ) -> SyncOutcome {
        SyncChecker::check(self, credential, login_endpoint, success_pattern).await
    }
}
