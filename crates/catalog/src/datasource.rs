use crate::error::CatalogError;
use crate::models::{Column, SchemaGraph, Table};
use crate::prompt::{self, DescribeOptions};
use crate::reflect;
use common::ConnectionSpec;
use db_clients::SqlClient;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// One registered datasource: connection details plus the reflected graph
/// and the redaction list applied to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datasource {
    pub id: Uuid,
    pub name: String,
    pub connection: ConnectionSpec,
    #[serde(default)]
    pub graph: SchemaGraph,
    #[serde(default)]
    pub excluded_columns: Vec<String>,
}

impl Datasource {
    pub fn new(name: &str, connection: ConnectionSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            connection,
            graph: SchemaGraph::default(),
            excluded_columns: Vec::new(),
        }
    }

    /// Rebuild the graph from the live schema. The previous graph is
    /// replaced wholesale; ids are fresh and the exclusion pass re-applies.
    pub async fn reflect(&mut self, client: &dyn SqlClient) -> Result<(), CatalogError> {
        self.graph = reflect::reflect(client, self.connection.dialect).await?;
        self.apply_exclusions();
        Ok(())
    }

    pub fn apply_exclusions(&mut self) {
        self.graph.set_excluded_columns(&self.excluded_columns);
    }

    /// Replace the redaction list and re-flag the graph.
    pub fn set_excluded_columns(&mut self, names: Vec<String>) {
        self.excluded_columns = names;
        self.apply_exclusions();
    }

    pub fn describe(&self, opts: &DescribeOptions) -> Result<String, CatalogError> {
        prompt::describe_datasource(
            &self.graph,
            self.connection.dialect,
            &self.name,
            self.id,
            opts,
        )
    }

    pub fn describe_table(&self, table_id: Uuid) -> Result<String, CatalogError> {
        let table = self
            .table_by_id(table_id)
            .ok_or_else(|| CatalogError::not_found(format!("no table with id {table_id}")))?;
        prompt::describe_table(table, &DescribeOptions::default())
    }

    pub fn table_by_id(&self, id: Uuid) -> Option<&Table> {
        self.graph.table_by_id(id)
    }

    pub fn column_by_id(&self, id: Uuid) -> Option<&Column> {
        self.graph.column_by_id(id)
    }
}

/// Flat persisted form, easy to serde.
#[derive(Default, Serialize, Deserialize)]
struct State {
    datasources: HashMap<Uuid, Datasource>,
}

/// Shared registry of datasources.
///
/// Reads dominate: every prompt build and every evaluation looks a
/// datasource up, while writes only happen on registration, re-reflection
/// or a redaction-list change. A `parking_lot::RwLock` behind an `Arc` keeps
/// concurrent readers cheap and gives writers exclusive access for the rare
/// mutation.
#[derive(Clone, Default)]
pub struct DatasourceCatalog {
    inner: Arc<RwLock<State>>,
}

impl DatasourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /* ---------- optional durability ---------- */

    pub fn load_from(path: &str) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).unwrap_or_else(|_| "{}".into());
        let state: State = serde_json::from_str(&json)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
        })
    }

    pub fn flush_to(&self, path: &str) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&*self.inner.read())?;
        let tmp = format!("{path}.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(tmp, path)?;
        Ok(())
    }

    /* ---------- lookup and upsert ---------- */

    pub fn register(&self, datasource: Datasource) -> Uuid {
        let id = datasource.id;
        self.inner.write().datasources.insert(id, datasource);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Datasource> {
        self.inner.read().datasources.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.inner.read().datasources.keys().copied().collect()
    }

    /// Mutate one datasource in place under the write lock.
    pub fn with_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Datasource) -> R,
    ) -> Result<R, CatalogError> {
        let mut state = self.inner.write();
        let ds = state
            .datasources
            .get_mut(&id)
            .ok_or_else(|| CatalogError::not_found(format!("no datasource with id {id}")))?;
        Ok(f(ds))
    }
}
