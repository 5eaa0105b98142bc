use common::error::diagnostics::DiagnosticMessage;
use common::types::params::CoercionError;
use db_clients::ClientError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("placeholder not found in query: {context}")]
    MissingPlaceholder { context: DiagnosticMessage },
    #[error("parameter value has the wrong type: {context}")]
    TypeCoercion {
        context: DiagnosticMessage,
        #[source]
        source: Option<CoercionError>,
    },
    #[error("query exceeded its {budget:?} budget: {context}")]
    TimedOut {
        context: DiagnosticMessage,
        budget: Duration,
    },
    #[error("query execution failed: {context}")]
    Execution {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("datasource unreachable: {context}")]
    Connection {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ExecutorError {
    #[track_caller]
    pub fn missing_placeholder(name: &str) -> Self {
        Self::MissingPlaceholder {
            context: DiagnosticMessage::new(format!(
                "parameter '{name}' has no {{{name}}} placeholder in the query text"
            )),
        }
    }

    #[track_caller]
    pub fn type_coercion(err: CoercionError) -> Self {
        Self::TypeCoercion {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(err),
        }
    }

    #[track_caller]
    pub fn timed_out(budget: Duration) -> Self {
        Self::TimedOut {
            context: DiagnosticMessage::new(format!(
                "no result after {:.1}s",
                budget.as_secs_f64()
            )),
            budget,
        }
    }

    #[track_caller]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }
}

impl From<ClientError> for ExecutorError {
    #[track_caller]
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidConnection { .. } | ClientError::Unsupported { .. } => {
                ExecutorError::Connection {
                    context: DiagnosticMessage::new(err.to_string()),
                    source: Some(Box::new(err)),
                }
            }
            ClientError::Driver { .. } => ExecutorError::Execution {
                context: DiagnosticMessage::new(err.to_string()),
                source: Some(Box::new(err)),
            },
        }
    }
}
