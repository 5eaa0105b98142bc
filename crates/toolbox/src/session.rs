//! The agent-facing tool surface.
//!
//! A [`Session`] holds one conversation's mutable state: the selected
//! datasource, the saved query template, the chart list and the last preview
//! frame. Each public method is one tool call; all of them answer with
//! plain values or a [`RetryPrompt`] the agent can act on.

use crate::error::RetryPrompt;
use crate::store::SessionState;
use catalog::{Datasource, DescribeOptions};
use charts::{ChartRenderer, ChartSpec, PlotlyRenderer};
use common::{DataFrame, Figure, QueryTemplate};
use executor::{render_with_defaults, QueryRunner};
use uuid::Uuid;

pub struct Session {
    id: Uuid,
    datasource: Datasource,
    runner: QueryRunner,
    renderer: Box<dyn ChartRenderer>,
    template: Option<QueryTemplate>,
    charts: Vec<ChartSpec>,
    preview: Option<DataFrame>,
}

impl Session {
    /// The datasource's exclusion list redacts results as well as prompts,
    /// so it is folded into the runner's drop set here.
    pub fn new(datasource: Datasource, mut runner: QueryRunner) -> Self {
        runner.extend_excluded_columns(&datasource.excluded_columns);
        Self {
            id: Uuid::new_v4(),
            datasource,
            runner,
            renderer: Box::new(PlotlyRenderer),
            template: None,
            charts: Vec::new(),
            preview: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn datasource(&self) -> &Datasource {
        &self.datasource
    }

    pub fn template(&self) -> Option<&QueryTemplate> {
        self.template.as_ref()
    }

    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    pub fn preview(&self) -> Option<&DataFrame> {
        self.preview.as_ref()
    }

    /// System-prompt text for the agent, with the schema prompt embedded.
    pub fn instructions(&self) -> Result<String, RetryPrompt> {
        let schema = self.datasource.describe(&DescribeOptions::default())?;
        Ok(format!(
            "You are a data scientist building charts over a SQL database.\n\
             Chat with the user to understand what they want to visualize, then\n\
             write a parametrized SQL query that fetches the data for it.\n\
             The database looks like the following:\n\
             <database>\n{schema}\n</database>\n\
             Use the execute_sql_query tool to explore the database and test your\n\
             queries. Save the final query with save_parametrized_query, then\n\
             attach charts to its result with add_chart."
        ))
    }

    /* ---------- tools ---------- */

    /// Run one statement against the datasource. An empty result is turned
    /// into a retry prompt; the agent wrote the filters, it can loosen them.
    pub async fn execute_sql_query(
        &self,
        query: &str,
        row_limit: Option<usize>,
    ) -> Result<DataFrame, RetryPrompt> {
        let frame = match row_limit {
            Some(limit) => self.runner.run_with_limit(query, limit).await?,
            None => self.runner.run(query).await?,
        };
        if frame.is_empty() {
            return Err(RetryPrompt::empty_result());
        }
        Ok(frame)
    }

    pub fn describe_table(&self, table_id: Uuid) -> Result<String, RetryPrompt> {
        Ok(self.datasource.describe_table(table_id)?)
    }

    /// Adopt a query template: render it with its parameter defaults,
    /// evaluate once as a preview, and keep template and preview on success.
    /// Existing charts stay; they re-bind to the new preview when edited.
    pub async fn save_parametrized_query(
        &mut self,
        template: QueryTemplate,
    ) -> Result<DataFrame, RetryPrompt> {
        let sql = render_with_defaults(&template)?;
        let frame = self.runner.run(&sql).await?;
        if frame.is_empty() {
            return Err(RetryPrompt::empty_result());
        }
        log::info!("saved query template '{}'", template.name);
        self.template = Some(template);
        self.preview = Some(frame.clone());
        Ok(frame)
    }

    pub fn add_chart(&mut self, spec: ChartSpec) -> Result<Figure, RetryPrompt> {
        let figure = self.draw(&spec)?;
        self.charts.push(spec);
        Ok(figure)
    }

    pub fn edit_chart(&mut self, index: usize, spec: ChartSpec) -> Result<Figure, RetryPrompt> {
        if index >= self.charts.len() {
            return Err(self.bad_index(index));
        }
        let figure = self.draw(&spec)?;
        self.charts[index] = spec;
        Ok(figure)
    }

    /// Drop one chart and redraw the rest, so the caller sees the dashboard
    /// as it now stands.
    pub fn remove_chart(&mut self, index: usize) -> Result<Vec<Figure>, RetryPrompt> {
        if index >= self.charts.len() {
            return Err(self.bad_index(index));
        }
        self.charts.remove(index);
        self.charts.iter().map(|spec| self.draw(spec)).collect()
    }

    fn draw(&self, spec: &ChartSpec) -> Result<Figure, RetryPrompt> {
        let frame = self.preview.as_ref().ok_or_else(|| {
            RetryPrompt::retry(
                "No query result to chart yet. Save a parametrized query first.",
            )
        })?;
        Ok(self.renderer.draw(spec, frame)?)
    }

    fn bad_index(&self, index: usize) -> RetryPrompt {
        RetryPrompt::retry(format!(
            "No chart at index {index}; the dashboard has {} chart(s).",
            self.charts.len()
        ))
    }

    /* ---------- persistence ---------- */

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            datasource: self.datasource.clone(),
            template: self.template.clone(),
            charts: self.charts.clone(),
            preview: self.preview.clone(),
        }
    }

    pub fn resume(id: Uuid, state: SessionState, mut runner: QueryRunner) -> Self {
        runner.extend_excluded_columns(&state.datasource.excluded_columns);
        Self {
            id,
            datasource: state.datasource,
            runner,
            renderer: Box::new(PlotlyRenderer),
            template: state.template,
            charts: state.charts,
            preview: state.preview,
        }
    }
}
