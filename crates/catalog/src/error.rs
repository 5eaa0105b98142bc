use common::error::diagnostics::DiagnosticMessage;
use db_clients::ClientError;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("datasource unreachable: {context}")]
    Connection {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("schema reflection failed: {context}")]
    Reflection {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("catalog lookup failed: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("serde json error: {context}")]
    SerdeJson {
        context: DiagnosticMessage,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error: {context}")]
    Io {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    #[track_caller]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn reflection(message: impl Into<String>) -> Self {
        Self::Reflection {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<ClientError> for CatalogError {
    #[track_caller]
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidConnection { .. } | ClientError::Unsupported { .. } => {
                CatalogError::Connection {
                    context: DiagnosticMessage::new(err.to_string()),
                    source: Some(Box::new(err)),
                }
            }
            ClientError::Driver { .. } => CatalogError::Reflection {
                context: DiagnosticMessage::new(err.to_string()),
                source: Some(Box::new(err)),
            },
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerdeJson {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}
