//! The bundled figure builder.
//!
//! `PlotlyRenderer` resolves a spec's column references against a frame and
//! assembles plotly-shaped trace/layout JSON. It is a data binder, not a
//! drawing engine: a frontend (or a real plotting library behind the
//! [`ChartRenderer`] trait) turns the figure into pixels.

use crate::spec::{ChartSpec, DisplayOptions};
use common::{DataFrame, DiagnosticMessage, Figure};
use serde_json::{json, Map, Value as Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("spec references a column the result does not have: {context}")]
    UnknownColumn { context: DiagnosticMessage },
}

impl ChartError {
    #[track_caller]
    pub fn unknown_column(name: &str, frame: &DataFrame) -> Self {
        Self::UnknownColumn {
            context: DiagnosticMessage::new(format!(
                "'{name}' not in result columns {:?}",
                frame.columns
            )),
        }
    }
}

/// The chart-drawing collaborator seam.
pub trait ChartRenderer: Send + Sync {
    fn draw(&self, spec: &ChartSpec, frame: &DataFrame) -> Result<Figure, ChartError>;
}

#[derive(Debug, Default)]
pub struct PlotlyRenderer;

impl ChartRenderer for PlotlyRenderer {
    fn draw(&self, spec: &ChartSpec, frame: &DataFrame) -> Result<Figure, ChartError> {
        // Validate every reference up front so errors name the column, not
        // a half-built trace.
        for name in spec.column_refs() {
            if frame.column_position(name).is_none() {
                return Err(ChartError::unknown_column(name, frame));
            }
        }

        let data = match spec {
            ChartSpec::Bar(c) => {
                grouped_traces(frame, c.color.as_deref(), |group| {
                    let mut trace = base_trace("bar", frame, group, c.x.as_deref(), c.y.as_deref());
                    maybe_column(&mut trace, "text", frame, group, c.text.as_deref());
                    maybe_str(&mut trace, "orientation", c.orientation.as_deref());
                    maybe_opacity(&mut trace, &c.display);
                    trace
                })?
            }
            ChartSpec::Line(c) => {
                grouped_traces(frame, c.color.as_deref(), |group| {
                    let mut trace =
                        base_trace("scatter", frame, group, c.x.as_deref(), c.y.as_deref());
                    let mode = if c.markers { "lines+markers" } else { "lines" };
                    trace.insert("mode".into(), json!(mode));
                    if let Some(shape) = &c.line_shape {
                        trace.insert("line".into(), json!({ "shape": shape }));
                    }
                    maybe_column(&mut trace, "text", frame, group, c.text.as_deref());
                    maybe_opacity(&mut trace, &c.display);
                    trace
                })?
            }
            ChartSpec::Scatter(c) => {
                grouped_traces(frame, c.color.as_deref(), |group| {
                    let mut trace =
                        base_trace("scatter", frame, group, c.x.as_deref(), c.y.as_deref());
                    trace.insert("mode".into(), json!("markers"));
                    if let Some(size) = &c.size {
                        let mut marker = Map::new();
                        marker.insert("size".into(), json!(select(frame, group, size)));
                        if let Some(max) = c.size_max {
                            marker.insert("sizemax".into(), json!(max));
                        }
                        trace.insert("marker".into(), Json::Object(marker));
                    }
                    maybe_column(&mut trace, "text", frame, group, c.text.as_deref());
                    maybe_opacity(&mut trace, &c.display);
                    trace
                })?
            }
            ChartSpec::Box(c) => {
                grouped_traces(frame, c.color.as_deref(), |group| {
                    let mut trace = base_trace("box", frame, group, c.x.as_deref(), c.y.as_deref());
                    if let Some(points) = &c.points {
                        let value = if points == "false" { json!(false) } else { json!(points) };
                        trace.insert("boxpoints".into(), value);
                    }
                    if c.notched {
                        trace.insert("notched".into(), json!(true));
                    }
                    trace
                })?
            }
            ChartSpec::Pie(c) => {
                let mut trace = Map::new();
                trace.insert("type".into(), json!("pie"));
                if let Some(names) = &c.names {
                    trace.insert("labels".into(), json!(select_all(frame, names)));
                }
                if let Some(values) = &c.values {
                    trace.insert("values".into(), json!(select_all(frame, values)));
                }
                if let Some(hole) = c.hole {
                    trace.insert("hole".into(), json!(hole));
                }
                vec![Json::Object(trace)]
            }
            ChartSpec::Histogram(c) => {
                grouped_traces(frame, c.color.as_deref(), |group| {
                    let mut trace =
                        base_trace("histogram", frame, group, c.x.as_deref(), c.y.as_deref());
                    if let Some(nbins) = c.nbins {
                        trace.insert("nbinsx".into(), json!(nbins));
                    }
                    maybe_str(&mut trace, "histfunc", c.histfunc.as_deref());
                    maybe_opacity(&mut trace, &c.display);
                    trace
                })?
            }
        };

        Ok(Figure {
            data,
            layout: layout_json(spec),
            config: None,
        })
    }
}

/// Row indices per color group. Without a color column there is a single
/// unnamed group spanning every row; with one, groups follow first
/// appearance, matching how a reader scans the data.
fn color_groups(
    frame: &DataFrame,
    color: Option<&str>,
) -> Result<Vec<(Option<Json>, Vec<usize>)>, ChartError> {
    let Some(color) = color else {
        return Ok(vec![(None, (0..frame.row_count()).collect())]);
    };
    let values = frame
        .column_values(color)
        .ok_or_else(|| ChartError::unknown_column(color, frame))?;
    let mut groups: Vec<(Option<Json>, Vec<usize>)> = Vec::new();
    for (row, value) in values.into_iter().enumerate() {
        match groups.iter_mut().find(|(key, _)| key.as_ref() == Some(&value)) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((Some(value), vec![row])),
        }
    }
    Ok(groups)
}

fn grouped_traces(
    frame: &DataFrame,
    color: Option<&str>,
    build: impl Fn(&[usize]) -> Map<String, Json>,
) -> Result<Vec<Json>, ChartError> {
    let mut traces = Vec::new();
    for (key, rows) in color_groups(frame, color)? {
        let mut trace = build(&rows);
        if let Some(key) = key {
            let name = match &key {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            };
            trace.insert("name".into(), json!(name));
        }
        traces.push(Json::Object(trace));
    }
    Ok(traces)
}

fn base_trace(
    kind: &str,
    frame: &DataFrame,
    group: &[usize],
    x: Option<&str>,
    y: Option<&str>,
) -> Map<String, Json> {
    let mut trace = Map::new();
    trace.insert("type".into(), json!(kind));
    maybe_column(&mut trace, "x", frame, group, x);
    maybe_column(&mut trace, "y", frame, group, y);
    trace
}

/// Column values restricted to one group's rows. References were validated
/// before trace building, so a missing column here would be a logic error;
/// it degrades to an empty array instead of panicking.
fn select(frame: &DataFrame, group: &[usize], column: &str) -> Vec<Json> {
    let Some(values) = frame.column_values(column) else {
        return Vec::new();
    };
    group
        .iter()
        .filter_map(|&row| values.get(row).cloned())
        .collect()
}

fn select_all(frame: &DataFrame, column: &str) -> Vec<Json> {
    frame.column_values(column).unwrap_or_default()
}

fn maybe_column(
    trace: &mut Map<String, Json>,
    field: &str,
    frame: &DataFrame,
    group: &[usize],
    column: Option<&str>,
) {
    if let Some(column) = column {
        trace.insert(field.into(), json!(select(frame, group, column)));
    }
}

fn maybe_str(trace: &mut Map<String, Json>, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        trace.insert(field.into(), json!(value));
    }
}

fn maybe_opacity(trace: &mut Map<String, Json>, display: &DisplayOptions) {
    if let Some(opacity) = display.opacity {
        trace.insert("opacity".into(), json!(opacity));
    }
}

fn layout_json(spec: &ChartSpec) -> Option<Json> {
    let display = spec.display();
    let mut layout = Map::new();

    if let Some(title) = &display.title {
        layout.insert("title".into(), json!({ "text": title }));
    }
    if let Some(template) = &display.template {
        layout.insert("template".into(), json!(template));
    }
    if let Some(width) = display.width {
        layout.insert("width".into(), json!(width));
    }
    if let Some(height) = display.height {
        layout.insert("height".into(), json!(height));
    }
    if let ChartSpec::Bar(bar) = spec {
        if let Some(barmode) = &bar.barmode {
            layout.insert("barmode".into(), json!(barmode));
        }
    }

    let mut xaxis = Map::new();
    if display.log_x {
        xaxis.insert("type".into(), json!("log"));
    }
    if let Some(range) = display.range_x {
        xaxis.insert("range".into(), json!(range));
    }
    if !xaxis.is_empty() {
        layout.insert("xaxis".into(), Json::Object(xaxis));
    }

    let mut yaxis = Map::new();
    if display.log_y {
        yaxis.insert("type".into(), json!("log"));
    }
    if let Some(range) = display.range_y {
        yaxis.insert("range".into(), json!(range));
    }
    if !yaxis.is_empty() {
        layout.insert("yaxis".into(), Json::Object(yaxis));
    }

    // Facet references pass through as layout metadata; subplot geometry is
    // the frontend's job.
    let (facet_row, facet_col) = spec.facets();
    let mut meta = Map::new();
    if let Some(facet_row) = facet_row {
        meta.insert("facet_row".into(), json!(facet_row));
    }
    if let Some(facet_col) = facet_col {
        meta.insert("facet_col".into(), json!(facet_col));
    }
    if !meta.is_empty() {
        layout.insert("meta".into(), Json::Object(meta));
    }

    if layout.is_empty() {
        None
    } else {
        Some(Json::Object(layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{BarChart, HistogramChart, LineChart, PieChart, ScatterChart};

    fn revenue_frame() -> DataFrame {
        DataFrame::new(
            vec!["month".into(), "revenue".into(), "region".into()],
            vec![
                vec![json!("jan"), json!(100.0), json!("north")],
                vec![json!("feb"), json!(120.0), json!("south")],
                vec![json!("mar"), json!(90.0), json!("north")],
            ],
        )
    }

    #[test]
    fn bar_traces_reference_exactly_the_bound_columns() {
        let spec = ChartSpec::Bar(BarChart {
            x: Some("month".into()),
            y: Some("revenue".into()),
            ..Default::default()
        });
        let figure = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap();

        assert_eq!(figure.data.len(), 1);
        let trace = &figure.data[0];
        assert_eq!(trace["type"], "bar");
        assert_eq!(trace["x"], json!(["jan", "feb", "mar"]));
        assert_eq!(trace["y"], json!([100.0, 120.0, 90.0]));
        assert!(trace.get("text").is_none());
        assert!(figure.layout.is_none());
    }

    #[test]
    fn color_column_splits_traces_by_first_appearance() {
        let spec = ChartSpec::Line(LineChart {
            x: Some("month".into()),
            y: Some("revenue".into()),
            color: Some("region".into()),
            ..Default::default()
        });
        let figure = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap();

        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[0]["name"], "north");
        assert_eq!(figure.data[0]["x"], json!(["jan", "mar"]));
        assert_eq!(figure.data[1]["name"], "south");
        assert_eq!(figure.data[1]["y"], json!([120.0]));
    }

    #[test]
    fn unknown_columns_fail_before_any_trace_is_built() {
        let spec = ChartSpec::Scatter(ScatterChart {
            x: Some("month".into()),
            y: Some("profit".into()),
            ..Default::default()
        });
        let err = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap_err();
        assert!(err.to_string().contains("profit"));
    }

    #[test]
    fn pie_maps_names_and_values_to_labels_and_values() {
        let spec = ChartSpec::Pie(PieChart {
            names: Some("region".into()),
            values: Some("revenue".into()),
            hole: Some(0.3),
            ..Default::default()
        });
        let figure = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap();
        let trace = &figure.data[0];
        assert_eq!(trace["labels"], json!(["north", "south", "north"]));
        assert_eq!(trace["values"], json!([100.0, 120.0, 90.0]));
        assert_eq!(trace["hole"], json!(0.3));
    }

    #[test]
    fn display_options_land_in_the_layout() {
        let mut bar = BarChart {
            x: Some("month".into()),
            y: Some("revenue".into()),
            barmode: Some("stack".into()),
            ..Default::default()
        };
        bar.display.title = Some("Monthly revenue".into());
        bar.display.log_y = true;
        bar.display.range_x = Some([0.0, 12.0]);
        let figure = PlotlyRenderer.draw(&ChartSpec::Bar(bar), &revenue_frame()).unwrap();

        let layout = figure.layout.unwrap();
        assert_eq!(layout["title"]["text"], "Monthly revenue");
        assert_eq!(layout["barmode"], "stack");
        assert_eq!(layout["yaxis"]["type"], "log");
        assert_eq!(layout["xaxis"]["range"], json!([0.0, 12.0]));
    }

    #[test]
    fn histogram_carries_binning_options() {
        let spec = ChartSpec::Histogram(HistogramChart {
            x: Some("revenue".into()),
            nbins: Some(20),
            histfunc: Some("sum".into()),
            ..Default::default()
        });
        let figure = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap();
        let trace = &figure.data[0];
        assert_eq!(trace["type"], "histogram");
        assert_eq!(trace["nbinsx"], json!(20));
        assert_eq!(trace["histfunc"], "sum");
    }

    #[test]
    fn facets_validate_and_land_in_layout_meta() {
        let spec = ChartSpec::Bar(BarChart {
            x: Some("month".into()),
            y: Some("revenue".into()),
            facet_col: Some("region".into()),
            ..Default::default()
        });
        let figure = PlotlyRenderer.draw(&spec, &revenue_frame()).unwrap();
        let layout = figure.layout.unwrap();
        assert_eq!(layout["meta"]["facet_col"], "region");

        let bad = ChartSpec::Bar(BarChart {
            x: Some("month".into()),
            facet_row: Some("territory".into()),
            ..Default::default()
        });
        let err = PlotlyRenderer.draw(&bad, &revenue_frame()).unwrap_err();
        assert!(err.to_string().contains("territory"));
    }

    #[test]
    fn empty_frames_render_empty_traces() {
        let spec = ChartSpec::Bar(BarChart::default());
        let figure = PlotlyRenderer.draw(&spec, &DataFrame::empty()).unwrap();
        assert_eq!(figure.data.len(), 1);
        assert!(figure.data[0].get("x").is_none());
    }
}
