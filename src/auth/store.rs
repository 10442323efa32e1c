use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

use super::AuthSession;

/// Persistence seam for the authentication session.
///
/// The crate ships [`MemoryTokenStore`]; applications that persist tokens
/// (file, keyring, browser storage bridge) implement this themselves.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<AuthSession>, AuthError>;
    fn save(&self, session: &AuthSession) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Errors surfaced by token storage backends.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token store error: {0}")]
    Store(String),
}

/// In-process token storage, lost when the client goes away.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<AuthSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: AuthSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthSession>, AuthError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| AuthError::Store("token store poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AuthError::Store("token store poisoned".into()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AuthError::Store("token store poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

/// Read side of the session used by the request pipeline.
///
/// A store failure is treated as "unauthenticated" rather than an error:
/// the request goes out without credentials and the backend decides.
#[derive(Clone)]
pub struct CredentialProvider {
    store: Arc<dyn TokenStore>,
    scheme: String,
}

impl CredentialProvider {
    pub fn new(store: Arc<dyn TokenStore>, scheme: impl Into<String>) -> Self {
        Self {
            store,
            scheme: scheme.into(),
        }
    }

    /// Current `Authorization` header value, e.g. `"Bearer <token>"`.
    pub fn authorization(&self) -> Option<String> {
        let session = self.session()?;
        if session.access_token.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.scheme, session.access_token))
    }

    /// Stored refresh token, `None` when absent or expired.
    pub fn refresh_credential(&self) -> Option<String> {
        let session = self.session()?;
        if session.refresh_usable() {
            session.refresh_token
        } else {
            None
        }
    }

    pub fn session(&self) -> Option<AuthSession> {
        match self.store.load() {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "token store unavailable, treating as unauthenticated");
                None
            }
        }
    }

    pub fn persist(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.store.save(session)
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn provider_with(session: Option<AuthSession>) -> CredentialProvider {
        let store = match session {
            Some(session) => MemoryTokenStore::with_session(session),
            None => MemoryTokenStore::new(),
        };
        CredentialProvider::new(Arc::new(store), "Bearer")
    }

    #[test]
    fn authorization_formats_scheme_and_token() {
        let provider = provider_with(Some(AuthSession::new("abc".into(), None)));
        assert_eq!(provider.authorization().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn authorization_none_when_unauthenticated() {
        let provider = provider_with(None);
        assert!(provider.authorization().is_none());
        assert!(provider.refresh_credential().is_none());
    }

    #[test]
    fn refresh_credential_hides_expired_token() {
        let session = AuthSession::new("abc".into(), Some("refresh".into()))
            .with_refresh_expiry(Utc::now() - Duration::seconds(1));
        let provider = provider_with(Some(session));
        assert!(provider.refresh_credential().is_none());
    }

    #[test]
    fn persist_then_read_back() {
        let provider = provider_with(None);
        provider
            .persist(&AuthSession::new("new".into(), Some("r".into())))
            .unwrap();
        assert_eq!(provider.authorization().as_deref(), Some("Bearer new"));
        assert_eq!(provider.refresh_credential().as_deref(), Some("r"));
        provider.clear().unwrap();
        assert!(provider.authorization().is_none());
    }
}
