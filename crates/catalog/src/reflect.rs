//! Live-schema reflection.
//!
//! Reflection is two-pass: pass one enumerates every table and column so the
//! whole graph exists before pass two resolves foreign keys by name;
//! otherwise forward references across tables cannot be attached. All ids
//! are minted fresh per reflection; nothing is derived from database object
//! ids.

use crate::error::CatalogError;
use crate::models::{Column, Join, SchemaGraph, Table};
use common::SqlDialect;
use db_clients::{RowSet, SqlClient};
use serde_json::Value as Json;

pub async fn reflect(
    client: &dyn SqlClient,
    dialect: SqlDialect,
) -> Result<SchemaGraph, CatalogError> {
    let graph = match dialect {
        SqlDialect::Sqlite => reflect_sqlite(client).await?,
        _ => reflect_information_schema(client, dialect).await?,
    };
    log::info!(
        "reflected {} tables ({} dialect)",
        graph.tables.len(),
        dialect
    );
    Ok(graph)
}

/// A resolved foreign-key constraint, staged between the two passes.
struct FkEdge {
    table: String,
    column: String,
    foreign_table: String,
    foreign_column: String,
}

async fn reflect_information_schema(
    client: &dyn SqlClient,
    dialect: SqlDialect,
) -> Result<SchemaGraph, CatalogError> {
    let columns = client.query(columns_sql(dialect)).await?;
    let mut graph = build_tables(&columns)?;

    let constraints = client.query(constraints_sql(dialect)).await?;
    apply_constraints(&mut graph, &constraints)?;

    let fks = client.query(foreign_keys_sql(dialect)).await?;
    let edges = fks
        .rows
        .iter()
        .map(|row| {
            Ok(FkEdge {
                table: str_cell(row, 0)?.to_string(),
                column: str_cell(row, 1)?.to_string(),
                foreign_table: str_cell(row, 2)?.to_string(),
                foreign_column: str_cell(row, 3)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;
    attach_joins(&mut graph, edges);

    Ok(graph)
}

/// First pass: tables in the order the engine reports them, columns in
/// declaration order.
fn build_tables(columns: &RowSet) -> Result<SchemaGraph, CatalogError> {
    let mut graph = SchemaGraph::default();
    for row in &columns.rows {
        let table_name = str_cell(row, 0)?;
        let column_name = str_cell(row, 1)?;
        let data_type = opt_str_cell(row, 2);
        let nullable = opt_str_cell(row, 3).map(|v| v.eq_ignore_ascii_case("yes"));
        let comment = opt_str_cell(row, 4);

        if graph.table_by_name(table_name).is_none() {
            graph.tables.push(Table::new(table_name));
        }
        let table = graph
            .tables
            .iter_mut()
            .find(|t| t.name == table_name)
            .ok_or_else(|| CatalogError::reflection("table vanished mid-pass"))?;
        let mut column = Column::new(table.id, column_name, data_type, nullable);
        column.comment = comment;
        table.columns.push(column);
    }
    Ok(graph)
}

fn apply_constraints(graph: &mut SchemaGraph, constraints: &RowSet) -> Result<(), CatalogError> {
    for row in &constraints.rows {
        let table_name = str_cell(row, 0)?.to_string();
        let column_name = str_cell(row, 1)?.to_string();
        let kind = str_cell(row, 2)?.to_string();
        let Some(table) = graph.tables.iter_mut().find(|t| t.name == table_name) else {
            continue;
        };
        let Some(column) = table.columns.iter_mut().find(|c| c.name == column_name) else {
            continue;
        };
        match kind.as_str() {
            "PRIMARY KEY" => column.primary_key = Some(true),
            "UNIQUE" => column.unique = Some(true),
            _ => {}
        }
    }
    Ok(())
}

/// Second pass: resolve each staged edge against the completed graph and
/// attach the join to the child column. Edges whose parent cannot be found
/// are logged and skipped rather than failing the reflection.
fn attach_joins(graph: &mut SchemaGraph, edges: Vec<FkEdge>) {
    for edge in edges {
        let Some(join) = graph.table_by_name(&edge.foreign_table).and_then(|parent| {
            parent.column_by_name(&edge.foreign_column).map(|col| Join {
                table: parent.name.clone(),
                table_id: parent.id,
                column_key: col.key.clone(),
                column_id: col.id,
            })
        }) else {
            log::warn!(
                "foreign key {}.{} references unknown {}.{}",
                edge.table,
                edge.column,
                edge.foreign_table,
                edge.foreign_column
            );
            continue;
        };

        if let Some(column) = graph
            .tables
            .iter_mut()
            .find(|t| t.name == edge.table)
            .and_then(|t| t.columns.iter_mut().find(|c| c.name == edge.column))
        {
            column.join = Some(join);
        }
    }
}

async fn reflect_sqlite(client: &dyn SqlClient) -> Result<SchemaGraph, CatalogError> {
    let names = client
        .query("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .await?;

    let mut graph = SchemaGraph::default();
    let mut edges = Vec::new();

    for row in &names.rows {
        let table_name = str_cell(row, 0)?.to_string();
        let mut table = Table::new(&table_name);

        let info = client
            .query(&format!("PRAGMA table_info('{table_name}')"))
            .await?;
        // PRAGMA table_info: cid, name, type, notnull, dflt_value, pk
        for info_row in &info.rows {
            let name = str_cell(info_row, 1)?;
            let ty = opt_str_cell(info_row, 2);
            let notnull = int_cell(info_row, 3)? != 0;
            let pk = int_cell(info_row, 5)? != 0;
            let mut column = Column::new(table.id, name, ty, Some(!notnull));
            if pk {
                column.primary_key = Some(true);
            }
            table.columns.push(column);
        }
        graph.tables.push(table);

        let fks = client
            .query(&format!("PRAGMA foreign_key_list('{table_name}')"))
            .await?;
        // PRAGMA foreign_key_list: id, seq, table, from, to
        for fk_row in &fks.rows {
            edges.push(FkEdge {
                table: table_name.clone(),
                column: str_cell(fk_row, 3)?.to_string(),
                foreign_table: str_cell(fk_row, 2)?.to_string(),
                foreign_column: str_cell(fk_row, 4)?.to_string(),
            });
        }
    }

    attach_joins(&mut graph, edges);
    Ok(graph)
}

fn columns_sql(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Postgres => {
            "SELECT c.table_name, c.column_name, c.data_type, c.is_nullable, \
                    col_description(to_regclass(quote_ident(c.table_schema) || '.' || quote_ident(c.table_name)), c.ordinal_position) AS comment \
             FROM information_schema.columns c \
             JOIN information_schema.tables t \
               ON t.table_schema = c.table_schema AND t.table_name = c.table_name \
             WHERE t.table_type = 'BASE TABLE' \
               AND c.table_schema NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY c.table_name, c.ordinal_position"
        }
        SqlDialect::Mysql => {
            "SELECT c.table_name, c.column_name, c.data_type, c.is_nullable, \
                    NULLIF(c.column_comment, '') AS comment \
             FROM information_schema.columns c \
             JOIN information_schema.tables t \
               ON t.table_schema = c.table_schema AND t.table_name = c.table_name \
             WHERE t.table_type = 'BASE TABLE' AND c.table_schema = DATABASE() \
             ORDER BY c.table_name, c.ordinal_position"
        }
        // No portable column-comment source on SQL Server.
        SqlDialect::Mssql => {
            "SELECT c.table_name, c.column_name, c.data_type, c.is_nullable, NULL AS comment \
             FROM information_schema.columns c \
             JOIN information_schema.tables t \
               ON t.table_schema = c.table_schema AND t.table_name = c.table_name \
             WHERE t.table_type = 'BASE TABLE' \
             ORDER BY c.table_name, c.ordinal_position"
        }
        SqlDialect::Sqlite => unreachable!("sqlite reflection goes through PRAGMA"),
    }
}

fn constraints_sql(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Mysql => {
            "SELECT tc.table_name, kcu.column_name, tc.constraint_type \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON kcu.constraint_name = tc.constraint_name \
              AND kcu.table_schema = tc.table_schema \
              AND kcu.table_name = tc.table_name \
             WHERE tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
               AND tc.table_schema = DATABASE()"
        }
        _ => {
            "SELECT tc.table_name, kcu.column_name, tc.constraint_type \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON kcu.constraint_name = tc.constraint_name \
              AND kcu.table_name = tc.table_name \
             WHERE tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')"
        }
    }
}

fn foreign_keys_sql(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Mysql => {
            "SELECT table_name, column_name, referenced_table_name AS foreign_table, \
                    referenced_column_name AS foreign_column \
             FROM information_schema.key_column_usage \
             WHERE referenced_table_name IS NOT NULL AND table_schema = DATABASE()"
        }
        _ => {
            "SELECT kcu.table_name, kcu.column_name, ccu.table_name AS foreign_table, \
                    ccu.column_name AS foreign_column \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON kcu.constraint_name = tc.constraint_name \
             JOIN information_schema.constraint_column_usage ccu \
               ON ccu.constraint_name = tc.constraint_name \
             WHERE tc.constraint_type = 'FOREIGN KEY'"
        }
    }
}

fn str_cell(row: &[Json], idx: usize) -> Result<&str, CatalogError> {
    row.get(idx)
        .and_then(Json::as_str)
        .ok_or_else(|| CatalogError::reflection(format!("expected text in column {idx}")))
}

fn opt_str_cell(row: &[Json], idx: usize) -> Option<String> {
    row.get(idx).and_then(Json::as_str).map(str::to_string)
}

fn int_cell(row: &[Json], idx: usize) -> Result<i64, CatalogError> {
    row.get(idx)
        .and_then(Json::as_i64)
        .ok_or_else(|| CatalogError::reflection(format!("expected integer in column {idx}")))
}
