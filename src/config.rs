use std::env;

use thiserror::Error;
use url::Url;

pub const DEFAULT_SUCCESS_CODE: &str = "0000";
pub const DEFAULT_AUTH_SCHEME: &str = "Bearer";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refreshToken/";

const ENV_BASE_URL: &str = "LINGUA_BASE_URL";
const ENV_SUCCESS_CODE: &str = "LINGUA_SUCCESS_CODE";
const ENV_LOGOUT_CODES: &str = "LINGUA_LOGOUT_CODES";
const ENV_MODAL_LOGOUT_CODES: &str = "LINGUA_MODAL_LOGOUT_CODES";
const ENV_EXPIRED_TOKEN_CODES: &str = "LINGUA_EXPIRED_TOKEN_CODES";
const ENV_AUTH_SCHEME: &str = "LINGUA_AUTH_SCHEME";

/// Read-only service configuration, loaded once at startup.
///
/// The three classification sets must be pairwise disjoint and must not
/// contain the success code; [`ServiceConfig::validate`] rejects anything
/// else. The refresh endpoint must never be configured to answer with an
/// expired-token code, otherwise the refresh loop would trigger itself.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub auth_scheme: String,
    pub success_code: String,
    pub logout_codes: Vec<String>,
    pub modal_logout_codes: Vec<String>,
    pub expired_token_codes: Vec<String>,
    pub refresh_path: String,
}

impl ServiceConfig {
    /// Configuration with defaults for the given backend base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_owned(),
            success_code: DEFAULT_SUCCESS_CODE.to_owned(),
            logout_codes: vec![],
            modal_logout_codes: vec![],
            expired_token_codes: vec![],
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
        }
    }

    /// Load and validate configuration from `LINGUA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var(ENV_BASE_URL).map_err(|_| ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(Url::parse(&raw)?);

        if let Ok(code) = env::var(ENV_SUCCESS_CODE) {
            config.success_code = code.trim().to_owned();
        }
        if let Ok(scheme) = env::var(ENV_AUTH_SCHEME) {
            config.auth_scheme = scheme.trim().to_owned();
        }
        if let Ok(codes) = env::var(ENV_LOGOUT_CODES) {
            config.logout_codes = parse_codes(&codes);
        }
        if let Ok(codes) = env::var(ENV_MODAL_LOGOUT_CODES) {
            config.modal_logout_codes = parse_codes(&codes);
        }
        if let Ok(codes) = env::var(ENV_EXPIRED_TOKEN_CODES) {
            config.expired_token_codes = parse_codes(&codes);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_logout_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logout_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_modal_logout_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modal_logout_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expired_token_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expired_token_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Reject configurations that would make classification ambiguous.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.success_code.trim().is_empty() {
            return Err(ConfigError::EmptySuccessCode);
        }

        let sets = [
            &self.logout_codes,
            &self.modal_logout_codes,
            &self.expired_token_codes,
        ];
        for set in sets {
            if set.iter().any(|code| code == &self.success_code) {
                return Err(ConfigError::SuccessCodeInSet {
                    code: self.success_code.clone(),
                });
            }
        }
        for (i, left) in sets.iter().enumerate() {
            for right in sets.iter().skip(i + 1) {
                if let Some(code) = left.iter().find(|code| right.contains(code)) {
                    return Err(ConfigError::OverlappingCodes { code: code.clone() });
                }
            }
        }
        Ok(())
    }

    /// Resolve an endpoint path against the base URL, keeping any path
    /// prefix the base URL carries. `Url::join` would drop the prefix for
    /// the absolute paths the endpoint wrappers use.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let relative = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{relative}"))
    }

    pub fn is_success_code(&self, code: &str) -> bool {
        code == self.success_code
    }

    pub fn is_logout_code(&self, code: &str) -> bool {
        self.logout_codes.iter().any(|c| c == code)
    }

    pub fn is_modal_logout_code(&self, code: &str) -> bool {
        self.modal_logout_codes.iter().any(|c| c == code)
    }

    pub fn is_expired_token_code(&self, code: &str) -> bool {
        self.expired_token_codes.iter().any(|c| c == code)
    }
}

/// Split a comma-separated code list, dropping empty entries.
fn parse_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Errors raised while loading or validating service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LINGUA_BASE_URL is not set")]
    MissingBaseUrl,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("success code must not be empty")]
    EmptySuccessCode,
    #[error("success code '{code}' also appears in a failure code set")]
    SuccessCodeInSet { code: String },
    #[error("code '{code}' appears in more than one classification set")]
    OverlappingCodes { code: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServiceConfig {
        ServiceConfig::new(Url::parse("http://localhost:8000").unwrap())
    }

    #[test]
    fn parse_codes_trims_and_drops_empty() {
        assert_eq!(parse_codes("4001, 4003,,"), vec!["4001", "4003"]);
        assert!(parse_codes("").is_empty());
    }

    #[test]
    fn disjoint_sets_pass_validation() {
        let config = base_config()
            .with_logout_codes(["4001"])
            .with_modal_logout_codes(["4010"])
            .with_expired_token_codes(["4002"]);
        config.validate().unwrap();
    }

    #[test]
    fn overlapping_sets_are_rejected() {
        let config = base_config()
            .with_logout_codes(["4001"])
            .with_expired_token_codes(["4001", "4002"]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingCodes { code } if code == "4001"));
    }

    #[test]
    fn success_code_in_set_is_rejected() {
        let config = base_config().with_logout_codes(["0000"]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::SuccessCodeInSet { .. }));
    }

    #[test]
    fn endpoint_preserves_base_path_prefix() {
        let config = ServiceConfig::new(Url::parse("http://host/api-prefix/").unwrap());
        assert_eq!(
            config.endpoint("/auth/login/").unwrap().as_str(),
            "http://host/api-prefix/auth/login/"
        );

        let config = ServiceConfig::new(Url::parse("http://host/api-prefix").unwrap());
        assert_eq!(
            config.endpoint("api/translate_single_text/").unwrap().as_str(),
            "http://host/api-prefix/api/translate_single_text/"
        );
    }

    #[test]
    fn endpoint_without_prefix_joins_plainly() {
        let config = base_config();
        assert_eq!(
            config.endpoint("/auth/login/").unwrap().as_str(),
            "http://localhost:8000/auth/login/"
        );
    }

    #[test]
    fn membership_helpers() {
        let config = base_config()
            .with_logout_codes(["4001"])
            .with_expired_token_codes(["4002"]);
        assert!(config.is_success_code("0000"));
        assert!(config.is_logout_code("4001"));
        assert!(config.is_expired_token_code("4002"));
        assert!(!config.is_modal_logout_code("4002"));
    }
}
