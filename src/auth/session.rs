use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session against the backend: the short-lived access
/// token plus the long-lived refresh token exchanged for new access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_issued_at")]
    pub issued_at: DateTime<Utc>,
}

fn default_issued_at() -> DateTime<Utc> {
    Utc::now()
}

impl AuthSession {
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: None,
            refresh_expires_at: None,
            issued_at: Utc::now(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_refresh_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.refresh_expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(ts) => Utc::now() >= ts,
            None => false,
        }
    }

    pub fn will_expire_within(&self, window: Duration) -> bool {
        match self.expires_at {
            Some(ts) => Utc::now() + window >= ts,
            None => false,
        }
    }

    /// Whether the stored refresh token can still be exchanged.
    pub fn refresh_usable(&self) -> bool {
        match self.refresh_token.as_deref() {
            None | Some("") => false,
            Some(_) => match self.refresh_expires_at {
                Some(ts) => Utc::now() < ts,
                None => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_expiry_detection() {
        let session = AuthSession::new("token".into(), Some("refresh".into()))
            .with_expiry(Utc::now() + Duration::minutes(1));
        assert!(!session.is_expired());
        assert!(session.will_expire_within(Duration::minutes(2)));
    }

    #[test]
    fn session_without_expiry_never_expires() {
        let session = AuthSession::new("token".into(), Some("refresh".into()));
        assert!(!session.is_expired());
        assert!(!session.will_expire_within(Duration::hours(1)));
        assert!(session.refresh_usable());
    }

    #[test]
    fn refresh_unusable_when_missing_or_stale() {
        let session = AuthSession::new("token".into(), None);
        assert!(!session.refresh_usable());

        let session = AuthSession::new("token".into(), Some(String::new()));
        assert!(!session.refresh_usable());

        let session = AuthSession::new("token".into(), Some("refresh".into()))
            .with_refresh_expiry(Utc::now() - Duration::minutes(1));
        assert!(!session.refresh_usable());
    }
}
