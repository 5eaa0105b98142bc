use crate::error::diagnostics::DiagnosticMessage;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {context}")]
    Io {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {context}")]
    Parse {
        context: DiagnosticMessage,
        #[source]
        source: toml::de::Error,
    },
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_row_limit() -> usize {
    500
}

fn default_evaluation_slots() -> usize {
    4
}

/// Workbench-wide settings, loaded from TOML.
///
/// `excluded_columns` is the name-based redaction list applied both to the
/// reflected schema graph (prompt side) and to query results (data side).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkbenchConfig {
    /// Budget for one query evaluation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Row cap applied to tool results so they stay prompt-sized.
    #[serde(default = "default_row_limit")]
    pub default_row_limit: usize,
    /// Concurrent evaluation slots per runner.
    #[serde(default = "default_evaluation_slots")]
    pub evaluation_slots: usize,
    /// Column names redacted from prompts and dropped from results.
    #[serde(default)]
    pub excluded_columns: Vec<String>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_timeout_secs(),
            default_row_limit: default_row_limit(),
            evaluation_slots: default_evaluation_slots(),
            excluded_columns: Vec::new(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            context: DiagnosticMessage::new(path.display().to_string()),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            context: DiagnosticMessage::new(path.display().to_string()),
            source,
        })
    }
}
