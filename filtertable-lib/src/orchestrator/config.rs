//! Orchestrator configuration

use std::time::Duration;

/// Configuration for a [`QueryOrchestrator`](super::QueryOrchestrator).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use filtertable_lib::orchestrator::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default()
///     .with_debounce(Duration::from_millis(300))
///     .with_request_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Quiet period after a filter change before the query is sent. The
    /// latest value within the window wins.
    ///
    /// Default: zero (send immediately)
    pub debounce: Duration,

    /// Upper bound on a single provider call.
    ///
    /// Default: none
    pub request_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    /// Creates a new orchestrator config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
