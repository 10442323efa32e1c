use std::sync::Arc;

use reqwest::{header, multipart, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{CredentialProvider, TokenStore};
use crate::config::ServiceConfig;

use super::classify::{Classifier, Outcome};
use super::envelope::BackendEnvelope;
use super::error::{ApiError, ErrorKind};
use super::hooks::{Notifier, SessionHooks};
use super::msg_stack::ErrorMsgStack;
use super::refresh::{RefreshCoordinator, RefreshOutcome};
use super::request::{Body, PartData, PartValue, RequestDescriptor};

const USER_AGENT: &str = "lingua-core/0.1.0";
const MODAL_TITLE: &str = "Error";

/// The interceptor pipeline: the single entry point endpoint wrappers use
/// to issue a logical request and receive decoded data or a classified,
/// already-presented-or-suppressed failure.
///
/// Per call: inject credentials, transmit, decode the envelope, classify
/// the business code, and branch, including one silent refresh-and-retry
/// round when the access token has expired.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ServiceConfig>,
    classifier: Classifier,
    credentials: CredentialProvider,
    refresh: Arc<RefreshCoordinator>,
    hooks: Arc<dyn SessionHooks>,
    notifier: Arc<dyn Notifier>,
    msg_stack: Arc<ErrorMsgStack>,
}

impl ApiClient {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn TokenStore>,
        hooks: Arc<dyn SessionHooks>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let config = Arc::new(config);
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let credentials = CredentialProvider::new(store, config.auth_scheme.clone());
        let refresh = Arc::new(RefreshCoordinator::new(
            http.clone(),
            config.clone(),
            credentials.clone(),
        ));
        Ok(Self {
            http,
            classifier: Classifier::new(config.clone()),
            config,
            credentials,
            refresh,
            hooks,
            notifier,
            msg_stack: Arc::new(ErrorMsgStack::new()),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// Issue a logical request and decode the envelope `data` into `T`.
    pub async fn send<T>(&self, descriptor: &RequestDescriptor) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let decoded = self
            .execute(descriptor)
            .await
            .and_then(|data| serde_json::from_value(data).map_err(ApiError::from));
        match decoded {
            Ok(value) => Ok(value),
            Err(err) => {
                self.surface(&err);
                Err(err)
            }
        }
    }

    /// Issue a request whose response is a binary stream. Envelope decoding
    /// and classification are skipped; any 2xx body comes back raw.
    pub async fn send_bytes(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>, ApiError> {
        let result = self.fetch_bytes(descriptor).await;
        match result {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.surface(&err);
                Err(err)
            }
        }
    }

    async fn fetch_bytes(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>, ApiError> {
        let response = self.transmit(descriptor).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        let mut refreshed = false;
        loop {
            let envelope = self.envelope_roundtrip(descriptor).await?;
            match self.classifier.classify(&envelope.code) {
                Outcome::Success => return Ok(envelope.data),
                Outcome::Logout => {
                    debug!(code = %envelope.code, "backend forced a logout");
                    self.force_logout();
                    return Err(ApiError::Logout {
                        code: envelope.code,
                    });
                }
                Outcome::ModalLogout => {
                    self.modal_logout(&envelope);
                    return Err(ApiError::ModalLogout {
                        code: envelope.code,
                        msg: envelope.msg,
                    });
                }
                Outcome::ExpiredToken if !refreshed => {
                    debug!(code = %envelope.code, "access token expired, coordinating refresh");
                    match self.refresh.handle_expired().await {
                        RefreshOutcome::Refreshed => {
                            // Retransmit once; credentials are re-read on build.
                            refreshed = true;
                            continue;
                        }
                        RefreshOutcome::FailedInitiator => {
                            warn!("refresh failed, terminating session");
                            self.force_logout();
                            return Err(ApiError::AuthExpired);
                        }
                        // The initiating caller resets the session; joined
                        // callers just report the terminal failure.
                        RefreshOutcome::FailedJoined => return Err(ApiError::AuthExpired),
                    }
                }
                // A second expired-token on the retried request would loop
                // the coordinator; demote it to a plain backend failure.
                Outcome::ExpiredToken | Outcome::UnclassifiedFail => {
                    return Err(ApiError::Backend {
                        code: envelope.code,
                        msg: envelope.msg,
                    });
                }
            }
        }
    }

    async fn envelope_roundtrip(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<BackendEnvelope, ApiError> {
        let response = self.transmit(descriptor).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<BackendEnvelope>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::HttpStatus {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) => Err(ApiError::Decode(err)),
        }
    }

    async fn transmit(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response, ApiError> {
        let url = self.config.endpoint(&descriptor.path)?;
        let mut builder = self.http.request(descriptor.method.clone(), url);

        if !descriptor.params.is_empty() {
            builder = builder.query(&descriptor.params);
        }

        // Caller-specified headers win over the injected credential.
        if !descriptor.has_header(header::AUTHORIZATION.as_str()) {
            if let Some(authorization) = self.credentials.authorization() {
                builder = builder.header(header::AUTHORIZATION, authorization);
            }
        }

        let is_multipart = descriptor.is_multipart();
        for (name, value) in &descriptor.headers {
            // The transport computes the multipart boundary itself; an
            // explicit content-type would clobber it.
            if is_multipart && name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }

        builder = match &descriptor.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        if let Some(timeout) = descriptor.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.send().await?)
    }

    fn force_logout(&self) {
        self.hooks.reset_session();
        self.hooks.to_login();
    }

    fn modal_logout(&self, envelope: &BackendEnvelope) {
        // One modal per distinct message, however many requests fail with it.
        if !self.msg_stack.push(&envelope.msg) {
            return;
        }
        let hooks = self.hooks.clone();
        let stack = self.msg_stack.clone();
        let msg = envelope.msg.clone();
        self.notifier.modal(
            MODAL_TITLE,
            &envelope.msg,
            Box::new(move || {
                hooks.reset_session();
                hooks.to_login();
                stack.remove(&msg);
            }),
        );
    }

    /// Toast failures the branches above did not already present. Logout
    /// paths navigate, modal paths prompt, refresh-demoted codes stay
    /// silent since the expiry itself was handled.
    fn surface(&self, err: &ApiError) {
        if let Some(code) = err.backend_code() {
            if self.config.is_modal_logout_code(code) || self.config.is_expired_token_code(code) {
                return;
            }
        }
        match err.kind() {
            ErrorKind::Transport | ErrorKind::Backend => {
                self.notifier.toast(&err.surface_message());
            }
            ErrorKind::Logout | ErrorKind::ModalLogout | ErrorKind::AuthExpired => {}
        }
    }
}

fn build_form(parts: &[PartData]) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new();
    for part in parts {
        let piece = match &part.value {
            PartValue::Text(text) => multipart::Part::text(text.clone()),
            PartValue::File {
                data,
                file_name,
                mime,
            } => multipart::Part::bytes(data.clone())
                .file_name(file_name.clone())
                .mime_str(mime)
                .map_err(|err| ApiError::InvalidRequest(format!("invalid part mime: {err}")))?,
        };
        form = form.part(part.name.clone(), piece);
    }
    Ok(form)
}
