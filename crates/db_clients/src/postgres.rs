use crate::{ClientError, RowSet, SqlClient};
use async_trait::async_trait;
use serde_json::Value as Json;
use tokio_postgres::types::Type;
use tokio_postgres::{NoTls, Row};

/// Postgres client over tokio-postgres.
///
/// `connect` spawns the connection driver onto the runtime; the client half
/// is then cheap to share behind [`SqlClient`].
pub struct PostgresClient {
    client: tokio_postgres::Client,
}

impl PostgresClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (client, connection) =
            tokio_postgres::connect(url, NoTls)
                .await
                .map_err(|err| ClientError::InvalidConnection {
                    context: common::DiagnosticMessage::new(err.to_string()),
                    source: Some(Box::new(err)),
                })?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                log::error!("postgres connection closed: {err}");
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl SqlClient for PostgresClient {
    async fn query(&self, sql: &str) -> Result<RowSet, ClientError> {
        // Column names come from the prepared statement so a zero-row
        // result still carries its header.
        let statement = self.client.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = self.client.query(&statement, &[]).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in &rows {
            data.push(row_to_cells(row)?);
        }
        Ok(RowSet::new(columns, data))
    }

    async fn execute(&self, sql: &str) -> Result<(), ClientError> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}

fn row_to_cells(row: &Row) -> Result<Vec<Json>, ClientError> {
    let mut cells = Vec::with_capacity(row.len());
    for idx in 0..row.len() {
        cells.push(cell_to_json(row, idx)?);
    }
    Ok(cells)
}

/// Decode one cell into a JSON scalar. Types without a mapping degrade to
/// null with a warning rather than failing the whole result set.
fn cell_to_json(row: &Row, idx: usize) -> Result<Json, ClientError> {
    let ty = row.columns()[idx].type_();

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Json::from)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|v| Json::from(i64::from(v)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|v| Json::from(i64::from(v)))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Json::from)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|v| Json::from(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Json::from)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.map(Json::from)
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(idx)?
            .map(|v| Json::from(v.to_string()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
            .map(|v| Json::from(v.to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(|v| Json::from(v.to_rfc3339()))
    } else if *ty == Type::TIME {
        row.try_get::<_, Option<chrono::NaiveTime>>(idx)?
            .map(|v| Json::from(v.to_string()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Json>>(idx)?
    } else {
        log::warn!(
            "no JSON mapping for postgres type '{}' in column '{}'",
            ty.name(),
            row.columns()[idx].name()
        );
        None
    };

    Ok(value.unwrap_or(Json::Null))
}
