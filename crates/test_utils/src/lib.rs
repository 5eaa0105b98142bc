//! Shared fixtures: a scripted [`SqlClient`] and canned reflection row sets,
//! so suites across the workspace run without a live database.

use async_trait::async_trait;
use db_clients::credentials::Keyring;
use db_clients::{ClientError, RowSet, SqlClient};
use serde_json::{json, Value as Json};
use std::time::Duration;

enum Scripted {
    Rows(RowSet),
    Error(String),
}

/// A [`SqlClient`] that answers from a script.
///
/// Rules are matched by substring against the incoming SQL, first match
/// wins; unmatched queries get an empty row set. An optional delay before
/// every answer makes timeout paths testable.
#[derive(Default)]
pub struct FakeClient {
    rules: Vec<(String, Scripted)>,
    delay: Option<Duration>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn on(mut self, needle: &str, rows: RowSet) -> Self {
        self.rules.push((needle.to_string(), Scripted::Rows(rows)));
        self
    }

    pub fn fail_on(mut self, needle: &str, message: &str) -> Self {
        self.rules
            .push((needle.to_string(), Scripted::Error(message.to_string())));
        self
    }
}

#[async_trait]
impl SqlClient for FakeClient {
    async fn query(&self, sql: &str) -> Result<RowSet, ClientError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        for (needle, scripted) in &self.rules {
            if sql.contains(needle.as_str()) {
                return match scripted {
                    Scripted::Rows(rows) => Ok(rows.clone()),
                    Scripted::Error(message) => Err(ClientError::driver(message.clone())),
                };
            }
        }
        Ok(RowSet::default())
    }
}

/// Keyring that decrypts everything to one fixed password.
pub struct StaticKeyring {
    password: String,
}

impl StaticKeyring {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
        }
    }
}

impl Keyring for StaticKeyring {
    fn decrypt(&self, _encrypted: &[u8]) -> Result<String, ClientError> {
        Ok(self.password.clone())
    }
}

/// Keyring whose decryption always fails, for the unauthorized path.
pub struct BrokenKeyring;

impl Keyring for BrokenKeyring {
    fn decrypt(&self, _encrypted: &[u8]) -> Result<String, ClientError> {
        Err(ClientError::invalid_connection("key mismatch"))
    }
}

pub fn rowset(columns: &[&str], rows: Vec<Vec<Json>>) -> RowSet {
    RowSet::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

/// Script the postgres information_schema answers for a two-table schema:
/// `customers(id, name)` and `orders(id, customer_id -> customers.id,
/// amount)`.
pub fn two_table_reflection_client() -> FakeClient {
    let columns = rowset(
        &["table_name", "column_name", "data_type", "is_nullable", "comment"],
        vec![
            vec![json!("customers"), json!("id"), json!("integer"), json!("NO"), Json::Null],
            vec![json!("customers"), json!("name"), json!("text"), json!("YES"), Json::Null],
            vec![json!("orders"), json!("id"), json!("integer"), json!("NO"), Json::Null],
            vec![json!("orders"), json!("customer_id"), json!("integer"), json!("NO"), Json::Null],
            vec![json!("orders"), json!("amount"), json!("numeric"), json!("YES"), Json::Null],
        ],
    );
    let constraints = rowset(
        &["table_name", "column_name", "constraint_type"],
        vec![
            vec![json!("customers"), json!("id"), json!("PRIMARY KEY")],
            vec![json!("orders"), json!("id"), json!("PRIMARY KEY")],
        ],
    );
    let foreign_keys = rowset(
        &["table_name", "column_name", "foreign_table", "foreign_column"],
        vec![vec![
            json!("orders"),
            json!("customer_id"),
            json!("customers"),
            json!("id"),
        ]],
    );

    FakeClient::new()
        .on("information_schema.columns", columns)
        .on("IN ('PRIMARY KEY', 'UNIQUE')", constraints)
        .on("'FOREIGN KEY'", foreign_keys)
}

/// Seeded `orders` rows used by the end-to-end evaluation scenarios: one
/// order above 100 and one below.
pub fn seeded_orders_client() -> FakeClient {
    two_table_reflection_client()
        .on(
            "amount > 100.0",
            rowset(
                &["id", "customer_id", "amount"],
                vec![vec![json!(1), json!(7), json!(150.0)]],
            ),
        )
        .on(
            "FROM orders",
            rowset(
                &["id", "customer_id", "amount"],
                vec![
                    vec![json!(1), json!(7), json!(150.0)],
                    vec![json!(2), json!(8), json!(50.0)],
                ],
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ConnectionSpec, SqlDialect};
    use db_clients::create_client;

    fn spec(dialect: SqlDialect) -> ConnectionSpec {
        ConnectionSpec::new(dialect, "localhost", 5432, "svc", vec![0x01], "trade")
    }

    #[tokio::test]
    async fn a_broken_keyring_invalidates_the_connection() {
        let err = create_client(&spec(SqlDialect::Postgres), &BrokenKeyring)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConnection { .. }));
    }

    #[tokio::test]
    async fn dialects_without_a_bundled_driver_are_refused() {
        let err = create_client(&spec(SqlDialect::Mysql), &StaticKeyring::new("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn unmatched_queries_answer_with_an_empty_rowset() {
        let client = FakeClient::new().on("orders", rowset(&["id"], vec![vec![json!(1)]]));
        let hit = client.query("SELECT * FROM orders").await.unwrap();
        assert_eq!(hit.rows.len(), 1);
        let miss = client.query("SELECT * FROM customers").await.unwrap();
        assert!(miss.rows.is_empty());
    }
}
