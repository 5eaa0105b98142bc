//! Conversation state persistence.
//!
//! A session's serializable half lives in a [`SessionState`]; the store maps
//! session ids to snapshots so a conversation can be picked up again after
//! the process that held the live session is gone.

use catalog::Datasource;
use charts::ChartSpec;
use common::{DataFrame, QueryTemplate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a session needs to resume, minus the live client and runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub datasource: Datasource,
    #[serde(default)]
    pub template: Option<QueryTemplate>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
    #[serde(default)]
    pub preview: Option<DataFrame>,
}

pub trait StateStore: Send + Sync {
    fn save(&self, id: Uuid, state: SessionState);
    fn load(&self, id: Uuid) -> Option<SessionState>;
    fn remove(&self, id: Uuid) -> Option<SessionState>;
}

/// In-process store, one map behind a lock. Snapshots are cloned out so
/// readers never hold the lock across an await.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, id: Uuid, state: SessionState) {
        self.inner.write().insert(id, state);
    }

    fn load(&self, id: Uuid) -> Option<SessionState> {
        self.inner.read().get(&id).cloned()
    }

    fn remove(&self, id: Uuid) -> Option<SessionState> {
        self.inner.write().remove(&id)
    }
}
