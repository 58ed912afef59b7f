//! Next-task suggestions: read an employee's task history, ask a language
//! model what should follow, parse the answer and store it as assignments.

mod client;
mod error;
mod parser;
mod persist;
mod prompt;
#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::SuggestionConfig;
use crate::core::llm::providers::OpenAiProvider;
use crate::core::store::types::TaskDetails;

pub use client::{ClientSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, SuggestionClient};
pub use error::SuggestionError;
pub use parser::{LabelledBlockParser, SuggestionParser};
pub use persist::{PersistOutcome, SuggestionPersister};
pub use prompt::build_prompt;

/// One parsed suggestion, not yet tied to an employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: String,
}

/// A suggestion ready to be written as an assignment row.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedTask {
    pub employee_id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub assigned_at: DateTime<Utc>,
}

impl SuggestedTask {
    pub fn from_draft(draft: &TaskDraft, employee_id: i64, assigned_at: DateTime<Utc>) -> Self {
        Self {
            employee_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: draft.priority.clone(),
            assigned_at,
        }
    }
}

/// Storage the pipeline reads history from and writes suggestions to.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks_for_employee(&self, employee_id: i64) -> Result<Vec<TaskDetails>>;

    /// Insert all rows atomically and return how many were written.
    async fn bulk_insert(&self, tasks: &[SuggestedTask]) -> Result<usize>;
}

#[derive(Debug, Clone, Serialize)]
pub struct NextTasksReport {
    pub employee_id: i64,
    pub employee_tasks: Vec<TaskDetails>,
    /// Raw completion text, verbatim.
    pub next_tasks: String,
    pub suggestions: Vec<TaskDraft>,
    pub persistence: PersistOutcome,
}

pub struct SuggestionPipeline {
    store: Arc<dyn TaskStore>,
    client: SuggestionClient,
    parser: Box<dyn SuggestionParser>,
    persister: SuggestionPersister,
}

impl SuggestionPipeline {
    pub fn new(store: Arc<dyn TaskStore>, client: SuggestionClient) -> Self {
        Self {
            persister: SuggestionPersister::new(Arc::clone(&store)),
            store,
            client,
            parser: Box::new(LabelledBlockParser),
        }
    }

    /// Wire the OpenAI-compatible provider from configuration. Returns `None`
    /// when no API key is available so the rest of the service can run.
    pub fn from_config(
        config: &SuggestionConfig,
        store: Arc<dyn TaskStore>,
        api_key: Option<String>,
    ) -> Result<Option<Self>> {
        let Some(api_key) = api_key else {
            warn!(
                "{} is not set; next-task suggestions are disabled",
                config.api_key_env
            );
            return Ok(None);
        };
        let settings = config.client_settings();
        let provider = OpenAiProvider::new(config.completions_url(), api_key, settings.timeout)?;
        info!(
            "Suggestions enabled via {} using model {}",
            config.base_url, settings.model
        );
        Ok(Some(Self::new(
            store,
            SuggestionClient::new(Arc::new(provider), settings),
        )))
    }

    pub fn with_parser(mut self, parser: Box<dyn SuggestionParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn client(&self) -> &SuggestionClient {
        &self.client
    }

    /// Suggest follow-up tasks for one employee. Only history lookup and the
    /// completion call can fail; parse and storage problems are reflected in
    /// the report.
    pub async fn generate_next_tasks(
        &self,
        employee_id: i64,
    ) -> Result<NextTasksReport, SuggestionError> {
        let employee_tasks = self
            .store
            .list_tasks_for_employee(employee_id)
            .await
            .map_err(|e| SuggestionError::TaskHistory {
                employee_id,
                reason: e.to_string(),
            })?;

        let prompt = build_prompt(&employee_tasks);
        debug!("Suggestion prompt for employee {}:\n{}", employee_id, prompt);
        let next_tasks = self.client.complete(&prompt).await?;
        debug!("Raw completion for employee {}:\n{}", employee_id, next_tasks);

        let suggestions = self.parser.parse(&next_tasks);
        info!(
            "Parsed {} suggestion(s) for employee {} from {} existing task(s)",
            suggestions.len(),
            employee_id,
            employee_tasks.len()
        );

        let persistence = self.persister.persist(employee_id, &suggestions).await;

        Ok(NextTasksReport {
            employee_id,
            employee_tasks,
            next_tasks,
            suggestions,
            persistence,
        })
    }
}
