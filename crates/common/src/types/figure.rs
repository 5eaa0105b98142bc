use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Canonical rendered-chart representation.
///
/// Wire contract: `{"data": [...], "layout": {...} | null, "config": {...} | null}`.
/// The shape matches plotly's figure JSON so any plotly-compatible frontend
/// can display it, but nothing in the workspace depends on a drawing
/// library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Json>,
    pub layout: Option<Json>,
    pub config: Option<Json>,
}

impl Figure {
    pub fn new(data: Vec<Json>, layout: Option<Json>) -> Self {
        Self {
            data,
            layout,
            config: None,
        }
    }
}
