use crate::error::ExecutorError;
use common::{DataFrame, WorkbenchConfig};
use db_clients::{RowSet, SqlClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Bounded, timeout-guarded query evaluation.
///
/// Every `run` call owns exactly one slot and one timer. Nothing is shared
/// or deduplicated between concurrent calls; identical queries re-execute.
/// A timeout cancels the caller's wait, not necessarily the in-flight
/// statement; depending on the driver the server may run it to completion.
pub struct QueryRunner {
    client: Arc<dyn SqlClient>,
    slots: Arc<Semaphore>,
    budget: Duration,
    row_cap: usize,
    excluded_columns: Vec<String>,
}

impl QueryRunner {
    pub fn new(client: Arc<dyn SqlClient>, config: &WorkbenchConfig) -> Self {
        Self {
            client,
            slots: Arc::new(Semaphore::new(config.evaluation_slots.max(1))),
            budget: Duration::from_secs(config.query_timeout_secs),
            row_cap: config.default_row_limit,
            excluded_columns: config.excluded_columns.clone(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Merge additional redaction names into the drop set, e.g. a
    /// datasource's own exclusion list on top of the workbench-wide one.
    pub fn extend_excluded_columns(&mut self, names: &[String]) {
        for name in names {
            if !self.excluded_columns.contains(name) {
                self.excluded_columns.push(name.clone());
            }
        }
    }

    /// Execute one statement and shape the result: excluded columns dropped
    /// (missing names ignored), rows capped. Zero rows is a valid outcome
    /// here; callers decide whether that deserves a retry nudge.
    pub async fn run(&self, sql: &str) -> Result<DataFrame, ExecutorError> {
        self.run_with_limit(sql, self.row_cap).await
    }

    pub async fn run_with_limit(&self, sql: &str, row_cap: usize) -> Result<DataFrame, ExecutorError> {
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| ExecutorError::execution("evaluation pool is shut down"))?;

        log::debug!("evaluating: {sql}");
        let rows = match timeout(self.budget, self.client.query(sql)).await {
            Err(_) => return Err(ExecutorError::timed_out(self.budget)),
            Ok(Err(err)) => return Err(err.into()),
            Ok(Ok(rows)) => rows,
        };

        let mut frame = frame_from_rows(rows);
        frame.drop_columns(&self.excluded_columns);
        frame.truncate(row_cap);
        Ok(frame)
    }
}

pub fn frame_from_rows(rows: RowSet) -> DataFrame {
    DataFrame::new(rows.columns, rows.rows)
}
