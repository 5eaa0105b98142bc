use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Row-major tabular query result.
///
/// This is the canonical, library-agnostic shape every evaluation produces
/// and every chart consumes. The serialized form is part of the wire
/// contract: `{"data": [[...]], "columns": [...], "index": [...] | null}`,
/// with `index` always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    pub data: Vec<Vec<Json>>,
    pub columns: Vec<String>,
    pub index: Option<Vec<Json>>,
}

impl DataFrame {
    /// Build a frame with a positional row index, mirroring the split
    /// orientation of the original wire format.
    pub fn new(columns: Vec<String>, data: Vec<Vec<Json>>) -> Self {
        let index = (0..data.len() as u64).map(Json::from).collect();
        Self {
            data,
            columns,
            index: Some(index),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom. `None` when the column name
    /// is unknown.
    pub fn column_values(&self, name: &str) -> Option<Vec<Json>> {
        let pos = self.column_position(name)?;
        Some(
            self.data
                .iter()
                .map(|row| row.get(pos).cloned().unwrap_or(Json::Null))
                .collect(),
        )
    }

    /// Drop the named columns. Names with no matching column are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(c))
            .map(|(i, _)| i)
            .collect();
        if keep.len() == self.columns.len() {
            return;
        }
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.data {
            *row = keep.iter().map(|&i| row.get(i).cloned().unwrap_or(Json::Null)).collect();
        }
    }

    /// Keep at most `cap` rows, trimming the index alongside the data.
    pub fn truncate(&mut self, cap: usize) {
        if self.data.len() <= cap {
            return;
        }
        self.data.truncate(cap);
        if let Some(index) = &mut self.index {
            index.truncate(cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DataFrame {
        DataFrame::new(
            vec!["month".into(), "revenue".into(), "secret".into()],
            vec![
                vec![json!("jan"), json!(10.0), json!("a")],
                vec![json!("feb"), json!(12.5), json!("b")],
                vec![json!("mar"), json!(9.0), json!("c")],
            ],
        )
    }

    #[test]
    fn wire_format_is_split_oriented() {
        let frame = DataFrame::new(vec!["a".into()], vec![vec![json!(1)]]);
        let wire = serde_json::to_value(&frame).unwrap();
        assert_eq!(wire, json!({"data": [[1]], "columns": ["a"], "index": [0]}));
    }

    #[test]
    fn index_serializes_as_null_when_absent() {
        let frame = DataFrame {
            data: vec![],
            columns: vec![],
            index: None,
        };
        let wire = serde_json::to_string(&frame).unwrap();
        assert!(wire.contains("\"index\":null"));
    }

    #[test]
    fn drop_columns_ignores_missing_names() {
        let mut frame = sample();
        frame.drop_columns(&["secret".into(), "no_such_column".into()]);
        assert_eq!(frame.columns, vec!["month", "revenue"]);
        assert_eq!(frame.data[0], vec![json!("jan"), json!(10.0)]);
    }

    #[test]
    fn truncate_trims_index_too() {
        let mut frame = sample();
        frame.truncate(2);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.index.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn column_values_preserve_row_order() {
        let frame = sample();
        assert_eq!(
            frame.column_values("month").unwrap(),
            vec![json!("jan"), json!("feb"), json!("mar")]
        );
        assert!(frame.column_values("nope").is_none());
    }
}
