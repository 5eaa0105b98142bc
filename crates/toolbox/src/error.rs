//! The error → retry-prompt boundary.
//!
//! Everything below this layer fails with typed errors; everything above it
//! is an agent that can only read text. A [`RetryPrompt`] is that text plus
//! one bit the orchestrating loop needs: whether retrying could possibly
//! help. The toolbox itself never retries.

use catalog::CatalogError;
use charts::ChartError;
use executor::ExecutorError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct RetryPrompt {
    pub message: String,
    pub recoverable: bool,
}

impl RetryPrompt {
    pub fn retry(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: false,
        }
    }

    /// Zero rows is not a driver error, but the agent should still react.
    pub fn empty_result() -> Self {
        Self::retry("The resulting DataFrame is empty. You may want to adjust your filters.")
    }
}

impl From<ExecutorError> for RetryPrompt {
    fn from(err: ExecutorError) -> Self {
        match &err {
            ExecutorError::TimedOut { budget, .. } => Self::retry(format!(
                "SQL query execution timed out after {} seconds",
                budget.as_secs()
            )),
            ExecutorError::Execution { .. } => {
                Self::retry(format!("Error while executing SQL query: {err}"))
            }
            ExecutorError::MissingPlaceholder { .. } | ExecutorError::TypeCoercion { .. } => {
                Self::retry(err.to_string())
            }
            ExecutorError::Connection { .. } => Self::fatal(err.to_string()),
        }
    }
}

impl From<CatalogError> for RetryPrompt {
    fn from(err: CatalogError) -> Self {
        match &err {
            // A bad table id is the agent's mistake to correct.
            CatalogError::NotFound { .. } => Self::retry(err.to_string()),
            _ => Self::fatal(err.to_string()),
        }
    }
}

impl From<ChartError> for RetryPrompt {
    fn from(err: ChartError) -> Self {
        Self::retry(err.to_string())
    }
}
