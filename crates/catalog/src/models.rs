use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One foreign-key edge: the owning (child) column points at a parent table
/// and column. Edges are recorded per constraint and never followed
/// transitively, so self- and cross-table references need no cycle handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub table: String,
    pub table_id: Uuid,
    pub column_key: String,
    pub column_id: Uuid,
}

/// A reflected column. `id` is a process-local identifier minted at
/// reflection time, not the database's object id; a re-reflection produces
/// fresh ids. `exclude` is the only mutable field after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub table_id: Uuid,
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub nullable: Option<bool>,
    pub primary_key: Option<bool>,
    pub unique: Option<bool>,
    pub comment: Option<String>,
    #[serde(default)]
    pub exclude: bool,
    pub join: Option<Join>,
}

impl Column {
    pub fn new(table_id: Uuid, name: &str, ty: Option<String>, nullable: Option<bool>) -> Self {
        Self {
            id: Uuid::new_v4(),
            table_id,
            name: name.to_string(),
            // The key mirrors the name unless the source schema aliases it.
            key: name.to_string(),
            ty,
            nullable,
            primary_key: None,
            unique: None,
            comment: None,
            exclude: false,
            join: None,
        }
    }
}

/// A reflected table with its columns in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            comment: None,
            columns: Vec::new(),
        }
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// The full table/column/join graph for one datasource.
///
/// Built once per reflection and append-only afterwards, except for the
/// `exclude` flags which the redaction pass rewrites in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaGraph {
    pub tables: Vec<Table>,
}

impl SchemaGraph {
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_by_id(&self, id: Uuid) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn tables_by_ids(&self, ids: &[Uuid]) -> Vec<&Table> {
        self.tables.iter().filter(|t| ids.contains(&t.id)).collect()
    }

    pub fn column_by_id(&self, id: Uuid) -> Option<&Column> {
        self.tables
            .iter()
            .flat_map(|t| t.columns.iter())
            .find(|c| c.id == id)
    }

    /// Name-based redaction. Columns whose name is listed get
    /// `exclude = true`; every other column is reset to `false`, so the pass
    /// fully overrides prior state and is idempotent.
    pub fn set_excluded_columns(&mut self, names: &[String]) {
        for table in &mut self.tables {
            for column in &mut table.columns {
                column.exclude = names.iter().any(|n| n == &column.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> SchemaGraph {
        let mut orders = Table::new("orders");
        orders.columns = vec![
            Column::new(orders.id, "id", Some("integer".into()), Some(false)),
            Column::new(orders.id, "amount", Some("numeric".into()), Some(true)),
            Column::new(orders.id, "secret_margin", Some("numeric".into()), Some(true)),
        ];
        SchemaGraph {
            tables: vec![orders],
        }
    }

    fn flags(g: &SchemaGraph) -> Vec<bool> {
        g.tables[0].columns.iter().map(|c| c.exclude).collect()
    }

    #[test]
    fn exclusion_is_idempotent_and_fully_overrides() {
        let mut g = graph();
        let names = vec!["secret_margin".to_string()];
        g.set_excluded_columns(&names);
        assert_eq!(flags(&g), vec![false, false, true]);

        // A second application changes nothing.
        g.set_excluded_columns(&names);
        assert_eq!(flags(&g), vec![false, false, true]);

        // A new list resets previously excluded columns.
        g.set_excluded_columns(&["amount".to_string()]);
        assert_eq!(flags(&g), vec![false, true, false]);
    }

    #[test]
    fn lookups_resolve_by_id_and_name() {
        let g = graph();
        let table = g.table_by_name("orders").unwrap();
        let column = table.column_by_name("amount").unwrap();
        assert_eq!(g.column_by_id(column.id).unwrap().name, "amount");
        assert_eq!(g.table_by_id(table.id).unwrap().name, "orders");
        assert!(g.table_by_name("customers").is_none());

        let subset = g.tables_by_ids(&[table.id, Uuid::new_v4()]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].name, "orders");
    }
}
