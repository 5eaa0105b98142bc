//! Declarative chart specifications.
//!
//! One closed union over six chart kinds. Variants are flat records of
//! optional encoding fields and share nothing but the ability to produce a
//! figure; callers dispatch on the kind, and an unknown kind fails at
//! deserialization rather than deep inside rendering. The agent emits these
//! structures, never executable code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChart),
    Line(LineChart),
    Scatter(ScatterChart),
    Box(BoxChart),
    Pie(PieChart),
    Histogram(HistogramChart),
}

/// Display options shared by every variant. Literal values, never column
/// references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub log_x: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub log_y: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_x: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_y: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// "v" or "h".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// "group", "stack", "relative" or "overlay".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub markers: bool,
    /// "linear", "spline", "hv", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// "all", "outliers", "suspectedoutliers" or "false".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub notched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbins: Option<u32>,
    /// "count", "sum", "avg", "min" or "max".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histfunc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_col: Option<String>,
    #[serde(default, flatten)]
    pub display: DisplayOptions,
}

impl ChartSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartSpec::Bar(_) => "bar",
            ChartSpec::Line(_) => "line",
            ChartSpec::Scatter(_) => "scatter",
            ChartSpec::Box(_) => "box",
            ChartSpec::Pie(_) => "pie",
            ChartSpec::Histogram(_) => "histogram",
        }
    }

    pub fn display(&self) -> &DisplayOptions {
        match self {
            ChartSpec::Bar(c) => &c.display,
            ChartSpec::Line(c) => &c.display,
            ChartSpec::Scatter(c) => &c.display,
            ChartSpec::Box(c) => &c.display,
            ChartSpec::Pie(c) => &c.display,
            ChartSpec::Histogram(c) => &c.display,
        }
    }

    /// Every field of this spec that names a column of the bound frame.
    /// This is the binding contract: anything not listed here is a literal
    /// display option.
    pub fn column_refs(&self) -> Vec<&str> {
        let (facet_row, facet_col) = self.facets();
        let fields: [Option<&str>; 7] = match self {
            ChartSpec::Bar(c) => {
                [c.x.as_deref(), c.y.as_deref(), c.color.as_deref(), c.text.as_deref(), None, facet_row, facet_col]
            }
            ChartSpec::Line(c) => {
                [c.x.as_deref(), c.y.as_deref(), c.color.as_deref(), c.text.as_deref(), None, facet_row, facet_col]
            }
            ChartSpec::Scatter(c) => {
                [c.x.as_deref(), c.y.as_deref(), c.color.as_deref(), c.text.as_deref(), c.size.as_deref(), facet_row, facet_col]
            }
            ChartSpec::Box(c) => {
                [c.x.as_deref(), c.y.as_deref(), c.color.as_deref(), None, None, facet_row, facet_col]
            }
            ChartSpec::Pie(c) => {
                [c.names.as_deref(), c.values.as_deref(), None, None, None, facet_row, facet_col]
            }
            ChartSpec::Histogram(c) => {
                [c.x.as_deref(), c.y.as_deref(), c.color.as_deref(), None, None, facet_row, facet_col]
            }
        };
        fields.iter().filter_map(|f| *f).collect()
    }

    /// Facet row/column references, present on every variant.
    pub fn facets(&self) -> (Option<&str>, Option<&str>) {
        match self {
            ChartSpec::Bar(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
            ChartSpec::Line(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
            ChartSpec::Scatter(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
            ChartSpec::Box(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
            ChartSpec::Pie(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
            ChartSpec::Histogram(c) => (c.facet_row.as_deref(), c.facet_col.as_deref()),
        }
    }
}
