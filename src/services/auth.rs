use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthSession;
use crate::http::{ApiClient, ApiError, RequestDescriptor};

/// Token pair returned by login, registration, and email-code login.
/// Email-code login yields an empty refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginToken {
    pub token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterPayload {
    pub email: String,
    pub code: String,
    pub password: String,
    pub confirm_password: String,
}

/// Account endpoints. Successful logins persist the returned token pair so
/// subsequent requests on the same client are authenticated.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, user_name: &str, password: &str) -> Result<LoginToken, ApiError> {
        let descriptor = RequestDescriptor::post("/auth/login/").json(json!({
            "userName": user_name,
            "password": password,
        }));
        let token: LoginToken = self.client.send(&descriptor).await?;
        self.adopt(&token);
        Ok(token)
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<LoginToken, ApiError> {
        let descriptor = RequestDescriptor::post("/auth/register/").json(json!({
            "email": payload.email,
            "code": payload.code,
            "password": payload.password,
            "confirmPassword": payload.confirm_password,
        }));
        let token: LoginToken = self.client.send(&descriptor).await?;
        self.adopt(&token);
        Ok(token)
    }

    pub async fn send_email_code(&self, email: &str) -> Result<(), ApiError> {
        let descriptor =
            RequestDescriptor::post("/auth/send_email_code/").json(json!({ "email": email }));
        self.client.send::<serde_json::Value>(&descriptor).await?;
        Ok(())
    }

    pub async fn user_info(&self) -> Result<UserInfo, ApiError> {
        self.client
            .send(&RequestDescriptor::get("/auth/getUserInfo"))
            .await
    }

    /// Ask the backend to reply with an arbitrary failure envelope; used to
    /// exercise the classification paths against a live deployment.
    pub async fn custom_backend_error(&self, code: &str, msg: &str) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::get("/auth/error")
            .query("code", code)
            .query("msg", msg);
        self.client.send::<serde_json::Value>(&descriptor).await?;
        Ok(())
    }

    fn adopt(&self, token: &LoginToken) {
        let refresh = if token.refresh_token.is_empty() {
            None
        } else {
            Some(token.refresh_token.clone())
        };
        let session = AuthSession::new(token.token.clone(), refresh);
        if let Err(err) = self.client.credentials().persist(&session) {
            tracing::warn!(error = %err, "login succeeded but tokens were not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::config::ServiceConfig;
    use crate::http::{NullHooks, NullNotifier};
    use httpmock::prelude::*;
    use std::sync::Arc;
    use url::Url;

    fn api(base_url: &str) -> AuthApi {
        let config = ServiceConfig::new(Url::parse(base_url).unwrap());
        let client = ApiClient::new(
            config,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(NullHooks),
            Arc::new(NullNotifier),
        )
        .unwrap();
        AuthApi::new(client)
    }

    #[tokio::test]
    async fn login_persists_token_pair() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login/")
                .json_body_obj(&serde_json::json!({
                    "userName": "ada",
                    "password": "secret"
                }));
            then.status(200).json_body_obj(&serde_json::json!({
                "code": "0000",
                "msg": "ok",
                "data": { "token": "access-1", "refreshToken": "refresh-1" }
            }));
        });

        let api = api(&server.base_url());
        let token = api.login("ada", "secret").await.unwrap();
        mock.assert();
        assert_eq!(token.token, "access-1");
        assert_eq!(
            api.client.credentials().authorization().as_deref(),
            Some("Bearer access-1")
        );
        assert_eq!(
            api.client.credentials().refresh_credential().as_deref(),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn empty_refresh_token_is_not_stored() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login/");
            then.status(200).json_body_obj(&serde_json::json!({
                "code": "0000",
                "msg": "ok",
                "data": { "token": "access-1", "refreshToken": "" }
            }));
        });

        let api = api(&server.base_url());
        api.login("ada", "secret").await.unwrap();
        assert!(api.client.credentials().refresh_credential().is_none());
    }

    #[tokio::test]
    async fn user_info_decodes_profile() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/auth/getUserInfo");
            then.status(200).json_body_obj(&serde_json::json!({
                "code": "0000",
                "msg": "ok",
                "data": { "id": 3, "username": "ada", "email": "ada@example.com" }
            }));
        });

        let api = api(&server.base_url());
        let info = api.user_info().await.unwrap();
        assert_eq!(info.id, 3);
        assert_eq!(info.username, "ada");
    }

    #[tokio::test]
    async fn custom_backend_error_passes_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/error")
                .query_param("code", "9999")
                .query_param("msg", "boom");
            then.status(200).json_body_obj(&serde_json::json!({
                "code": "9999",
                "msg": "boom",
                "data": null
            }));
        });

        let api = api(&server.base_url());
        let err = api.custom_backend_error("9999", "boom").await.unwrap_err();
        mock.assert();
        assert_eq!(err.backend_code(), Some("9999"));
    }
}
