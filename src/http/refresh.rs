use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use crate::auth::{AuthSession, CredentialProvider};
use crate::config::ServiceConfig;

use super::envelope::BackendEnvelope;
use super::error::ApiError;

const REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one coordinated refresh round.
///
/// Failure distinguishes the caller that drove the refresh from the
/// callers that joined it, so terminal side effects (session reset,
/// navigation) run once per round instead of once per waiting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh credentials are in the store; retry the original request.
    Refreshed,
    /// Refresh failed and this caller initiated it; it owns cleanup.
    FailedInitiator,
    /// Refresh failed; the initiating caller owns cleanup.
    FailedJoined,
}

impl RefreshOutcome {
    pub fn refreshed(self) -> bool {
        self == RefreshOutcome::Refreshed
    }
}

/// Serializes token refresh so that concurrent requests hitting an expiry
/// window trigger exactly one refresh call.
///
/// The first caller to observe the expiry drives the refresh; everyone
/// else parks on a oneshot receiver and is resolved in FIFO registration
/// order with the same boolean outcome. The refresh request goes straight
/// through the transport, never through the interceptor pipeline, so a
/// failing refresh can not recursively trigger itself. For the same
/// reason the refresh endpoint must never be configured to answer with a
/// code from the expired-token set; it should fail with a logout or
/// modal-logout code instead.
pub struct RefreshCoordinator {
    http: Client,
    config: Arc<ServiceConfig>,
    credentials: CredentialProvider,
    state: Mutex<RefreshState>,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<bool>>,
}

#[derive(Deserialize)]
struct RefreshedTokens {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, config: Arc<ServiceConfig>, credentials: CredentialProvider) -> Self {
        Self {
            http,
            config,
            credentials,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Called by the pipeline when a response classifies as expired-token.
    /// [`RefreshOutcome::Refreshed`] means a fresh credential is in the
    /// store and the original request should be retried.
    pub async fn handle_expired(&self) -> RefreshOutcome {
        let joined = {
            let mut state = self.state.lock().await;
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = joined {
            // The in-flight refresh settles every registered waiter
            // exactly once; a dropped sender can only mean it failed.
            return if rx.await.unwrap_or(false) {
                RefreshOutcome::Refreshed
            } else {
                RefreshOutcome::FailedJoined
            };
        }

        let success = self.run_refresh().await;

        let waiters = {
            let mut state = self.state.lock().await;
            state.refreshing = false;
            state.waiters.drain(..).collect::<Vec<_>>()
        };
        for waiter in waiters {
            let _ = waiter.send(success);
        }
        if success {
            RefreshOutcome::Refreshed
        } else {
            RefreshOutcome::FailedInitiator
        }
    }

    async fn run_refresh(&self) -> bool {
        let Some(refresh_token) = self.credentials.refresh_credential() else {
            warn!("no usable refresh credential, session can not be renewed");
            return false;
        };

        match self.request_new_tokens(&refresh_token).await {
            Ok(session) => {
                if let Err(err) = self.credentials.persist(&session) {
                    warn!(error = %err, "refreshed tokens could not be persisted");
                    return false;
                }
                debug!("access token refreshed");
                true
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                false
            }
        }
    }

    async fn request_new_tokens(&self, refresh_token: &str) -> Result<AuthSession, ApiError> {
        let url = self.config.endpoint(&self.config.refresh_path)?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "refreshToken": refresh_token }))
            .timeout(REFRESH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus { status, body });
        }

        let envelope: BackendEnvelope = response.json().await?;
        if !self.config.is_success_code(&envelope.code) {
            return Err(ApiError::Backend {
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        let tokens: RefreshedTokens = serde_json::from_value(envelope.data)?;
        let mut session = AuthSession::new(tokens.token, tokens.refresh_token);
        // Keep the old refresh token when the backend does not rotate it.
        if !session.refresh_usable() {
            session.refresh_token = Some(refresh_token.to_owned());
        }
        Ok(session)
    }
}
