use std::sync::Arc;

use crate::config::ServiceConfig;

/// Label attached to a decoded envelope by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Immediate forced logout.
    Logout,
    /// Logout behind a confirmation dialog.
    ModalLogout,
    /// Access token expired; a silent refresh-and-retry may recover.
    ExpiredToken,
    /// Transport succeeded but the backend reported an unrecognized failure.
    UnclassifiedFail,
}

/// Maps backend business codes onto [`Outcome`]s using the configured sets.
///
/// The sets are validated to be disjoint at startup; the fixed evaluation
/// order below is the tie-break should a hand-built config bypass that.
#[derive(Clone)]
pub struct Classifier {
    config: Arc<ServiceConfig>,
}

impl Classifier {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self { config }
    }

    pub fn classify(&self, code: &str) -> Outcome {
        if self.config.is_logout_code(code) {
            Outcome::Logout
        } else if self.config.is_modal_logout_code(code) {
            Outcome::ModalLogout
        } else if self.config.is_expired_token_code(code) {
            Outcome::ExpiredToken
        } else if self.config.is_success_code(code) {
            Outcome::Success
        } else {
            Outcome::UnclassifiedFail
        }
    }
}
