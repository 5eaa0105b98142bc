pub mod credentials;
pub mod postgres;

use crate::credentials::Keyring;
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use common::error::diagnostics::DiagnosticMessage;
use common::{ConnectionSpec, SqlDialect};
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid connection details: {context}")]
    InvalidConnection {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("statement failed: {context}")]
    Driver {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("unsupported engine: {context}")]
    Unsupported { context: DiagnosticMessage },
}

impl ClientError {
    #[track_caller]
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::InvalidConnection {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<tokio_postgres::Error> for ClientError {
    #[track_caller]
    fn from(err: tokio_postgres::Error) -> Self {
        ClientError::Driver {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// A raw result set as delivered by a driver, before it becomes a
/// [`common::DataFrame`]. Cells are JSON scalars so the shape carries no
/// driver types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Json>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Json>>) -> Self {
        Self { columns, rows }
    }
}

/// The database-handle seam: one function per contract, `query` for result
/// sets and `execute` for statements without one.
///
/// Implementations own the blocking/async split; anything that blocks must
/// do so off the scheduler (e.g. via `spawn_blocking`) so callers can treat
/// every client as non-blocking.
#[async_trait]
pub trait SqlClient: Send + Sync {
    async fn query(&self, sql: &str) -> Result<RowSet, ClientError>;

    async fn execute(&self, sql: &str) -> Result<(), ClientError> {
        self.query(sql).await.map(|_| ())
    }
}

/// Assemble the connection URL for a spec. Pure dialect → scheme mapping;
/// the decrypted password only lives inside the returned string.
pub fn connection_url(spec: &ConnectionSpec, password: &str) -> String {
    match spec.dialect {
        SqlDialect::Sqlite => format!("sqlite://{}", spec.database),
        _ => format!(
            "{}://{}:{}@{}:{}/{}",
            spec.dialect.scheme(),
            spec.username,
            password,
            spec.host,
            spec.port,
            spec.database
        ),
    }
}

/// Open a client for the connection, decrypting the password via the keyring.
///
/// Postgres is the only engine wired up end to end; the other dialects keep
/// their URL mapping and reflection SQL but have no bundled driver yet.
pub async fn create_client(
    spec: &ConnectionSpec,
    keyring: &dyn Keyring,
) -> Result<Box<dyn SqlClient>, ClientError> {
    let password = keyring.decrypt(&spec.encrypted_password)?;
    match spec.dialect {
        SqlDialect::Postgres => {
            let url = connection_url(spec, &password);
            Ok(Box::new(PostgresClient::connect(&url).await?))
        }
        other => Err(ClientError::unsupported(format!(
            "no bundled driver for dialect '{other}'"
        ))),
    }
}
