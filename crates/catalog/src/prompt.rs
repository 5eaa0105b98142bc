//! Schema-to-prompt serialization.
//!
//! The output of `describe` is injected verbatim into agent prompts, so it
//! must be byte-identical across calls while the graph is unchanged: field
//! order is fixed by the serialize structs below and tables/columns keep
//! graph order.

use crate::error::CatalogError;
use crate::models::{Column, SchemaGraph, Table};
use common::SqlDialect;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct DescribeOptions {
    /// Column names only, one string per column. Short output lists every
    /// column, excluded or not; only the full form applies redaction. That
    /// asymmetry is relied on by existing prompts.
    pub short: bool,
    /// Restrict output to these tables. Joins pointing outside the subset
    /// are omitted.
    pub table_subset: Option<Vec<Uuid>>,
    /// Emit stable ids next to names so tooling can reference tables and
    /// columns unambiguously later.
    pub include_ids: bool,
    /// Prefix with dialect/name/id of the datasource.
    pub include_datasource_info: bool,
}

#[derive(Serialize)]
struct JoinDoc<'a> {
    table: &'a str,
    column_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Serialize)]
struct ColumnAttrs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: &'a str,
    key: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    join: Option<JoinDoc<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ColumnDoc<'a> {
    Name(&'a str),
    Full(Box<ColumnAttrs<'a>>),
}

#[derive(Serialize)]
struct TableDoc<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    table_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    columns: Vec<ColumnDoc<'a>>,
}

#[derive(Serialize)]
struct DatasourceDoc<'a> {
    datasource_type: &'static str,
    sql_dialect: SqlDialect,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    tables: Vec<TableDoc<'a>>,
}

fn column_doc<'a>(
    column: &'a Column,
    subset: Option<&[Uuid]>,
    opts: &DescribeOptions,
) -> ColumnDoc<'a> {
    if opts.short {
        return ColumnDoc::Name(&column.name);
    }

    let join = column.join.as_ref().and_then(|join| {
        if subset.is_some_and(|ids| !ids.contains(&join.table_id)) {
            return None;
        }
        Some(JoinDoc {
            table: &join.table,
            column_key: &join.column_key,
            id: opts.include_ids.then(|| join.column_id.to_string()),
        })
    });

    ColumnDoc::Full(Box::new(ColumnAttrs {
        id: opts.include_ids.then(|| column.id.to_string()),
        name: &column.name,
        key: &column.key,
        ty: column.ty.as_deref(),
        nullable: column.nullable,
        primary_key: column.primary_key,
        unique: column.unique,
        comment: column.comment.as_deref(),
        join,
    }))
}

fn table_doc<'a>(table: &'a Table, subset: Option<&[Uuid]>, opts: &DescribeOptions) -> TableDoc<'a> {
    let columns = table
        .columns
        .iter()
        .filter(|c| opts.short || !c.exclude)
        .map(|c| column_doc(c, subset, opts))
        .collect();
    TableDoc {
        id: opts.include_ids.then(|| table.id.to_string()),
        table_name: &table.name,
        description: table.description.as_deref(),
        comment: table.comment.as_deref(),
        columns,
    }
}

fn table_docs<'a>(graph: &'a SchemaGraph, opts: &DescribeOptions) -> Vec<TableDoc<'a>> {
    let subset = opts.table_subset.as_deref();
    graph
        .tables
        .iter()
        .filter(|t| subset.is_none_or(|ids| ids.contains(&t.id)))
        .map(|t| table_doc(t, subset, opts))
        .collect()
}

/// Serialize the (optionally restricted) graph alone, without datasource
/// framing.
pub fn describe_graph(graph: &SchemaGraph, opts: &DescribeOptions) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(&table_docs(graph, opts))?)
}

/// Serialize one table on its own, e.g. for the `describe_table` tool.
pub fn describe_table(table: &Table, opts: &DescribeOptions) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(&table_doc(table, None, opts))?)
}

/// Serialize the graph with datasource framing when
/// `include_datasource_info` is set.
pub fn describe_datasource(
    graph: &SchemaGraph,
    dialect: SqlDialect,
    name: &str,
    id: Uuid,
    opts: &DescribeOptions,
) -> Result<String, CatalogError> {
    let doc = DatasourceDoc {
        datasource_type: "SQL Database",
        sql_dialect: dialect,
        name: opts.include_datasource_info.then_some(name),
        id: opts.include_datasource_info.then(|| id.to_string()),
        tables: table_docs(graph, opts),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
