//! Error types for the admin API client
//!
//! Network and backend failures are reported to the user and never end the
//! editing session: the draft survives so the request can be resubmitted.

use abtest_core::{VariantSetError, WizardError};

/// Admin API failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// 4xx response
    #[error("client error (status {status}): {message}")]
    Client { status: u16, message: String },

    /// 5xx response
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not decode
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Base URL could not be used
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// True if resubmitting the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server { .. })
    }

    /// True for a 404 response
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Client { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failures while driving the wizard against the API
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Launch gate or edit refused locally
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<VariantSetError> for LaunchError {
    fn from(err: VariantSetError) -> Self {
        Self::Wizard(WizardError::Variants(err))
    }
}

impl LaunchError {
    /// Reasons to show verbatim when the launch gate refused the draft
    #[must_use]
    pub fn blocking_reasons(&self) -> Vec<String> {
        match self {
            Self::Wizard(WizardError::LaunchBlocked { reasons }) => {
                reasons.iter().map(ToString::to_string).collect()
            }
            Self::Wizard(err) if err.is_launch_gate() => vec![err.to_string()],
            _ => Vec::new(),
        }
    }
}
