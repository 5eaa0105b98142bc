pub mod render;
pub mod spec;

pub use render::{ChartError, ChartRenderer, PlotlyRenderer};
pub use spec::{
    BarChart, BoxChart, ChartSpec, DisplayOptions, HistogramChart, LineChart, PieChart,
    ScatterChart,
};
