//! Runner configuration.

use crate::placeholder::Placeholder;
use std::time::Duration;

/// Configuration for [`PgRunner`](crate::PgRunner) and
/// [`PoolRunner`](crate::PoolRunner).
#[derive(Debug, Clone)]
pub struct PgRunnerConfig {
    /// Query timeout duration. Statements still running when it elapses are
    /// cancelled on the server and fail with [`QbError::Timeout`](crate::QbError::Timeout).
    pub query_timeout: Option<Duration>,
    /// Placeholder format builders fall back to when they have none set.
    pub placeholder: Placeholder,
    /// Ask the server to cancel a statement whose cancellation token fired.
    pub cancel_on_abort: bool,
}

impl Default for PgRunnerConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            placeholder: Placeholder::Dollar,
            cancel_on_abort: true,
        }
    }
}

impl PgRunnerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    /// Set the fallback placeholder format.
    pub fn placeholder(mut self, format: Placeholder) -> Self {
        self.placeholder = format;
        self
    }

    /// Only stop waiting when a token fires; leave the server-side statement running.
    pub fn keep_running_on_abort(mut self) -> Self {
        self.cancel_on_abort = false;
        self
    }
}
