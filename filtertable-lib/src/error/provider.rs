//! Data provider error types

use std::time::Duration;

/// Errors that a [`DataProvider`](crate::provider::DataProvider) can return.
///
/// Provider errors are recovered by the orchestrator: the loading flag is
/// cleared, rows already on screen stay visible and the error is handed to
/// the error listeners.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The backing store failed to answer the query.
    #[error("provider failure: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
        /// Provider-specific error code, if available.
        code: Option<String>,
    },

    /// The query did not complete in time.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the query itself.
    #[error("invalid query: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Creates a new backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            code: None,
        }
    }

    /// Creates a new backend error with a provider-specific code.
    pub fn backend_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Returns the provider-specific error code if available.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if re-issuing the same query may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { .. } => true,
            Self::Timeout(_) => true,
            Self::InvalidRequest(_) => false,
        }
    }
}
