//! In-memory doubles for exercising the suggestion pipeline without a
//! database or network.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SuggestedTask, TaskStore};
use crate::core::llm::{ChatMessage, LlmError, LlmProvider};
use crate::core::store::types::TaskDetails;

pub fn sample_task(
    id: i64,
    employee: i64,
    title: &str,
    description: &str,
    priority: &str,
) -> TaskDetails {
    TaskDetails {
        id,
        title: title.to_string(),
        description: description.to_string(),
        date: None,
        git_link: None,
        hosting_link: None,
        task_type: None,
        status: "pending".to_string(),
        priority: priority.to_string(),
        start_time: None,
        end_time: None,
        created_at: "2026-01-01 09:00:00".to_string(),
        estimated_hours: None,
        employee,
        employee_name: format!("Employee {employee}"),
        screenshots: Vec::new(),
    }
}

/// Replays queued outcomes in order; once empty it keeps failing with a
/// transport error.
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    models: Mutex<Vec<(String, u32)>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<String, LlmError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<(String, u32)> {
        self.models.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(first) = messages.first() {
            self.prompts.lock().unwrap().push(first.content.clone());
        }
        self.models
            .lock()
            .unwrap()
            .push((model_id.to_string(), max_tokens));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
    }
}

/// Never answers; used to exercise per-attempt timeouts.
pub struct HangingProvider;

#[async_trait]
impl LlmProvider for HangingProvider {
    fn provider_id(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _: &str, _: &[ChatMessage], _: u32) -> Result<String, LlmError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    pub tasks: Vec<TaskDetails>,
    pub fail_history: bool,
    pub fail_inserts: bool,
    pub inserted: Mutex<Vec<SuggestedTask>>,
    pub insert_calls: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn with_tasks(tasks: Vec<TaskDetails>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    pub fn inserted(&self) -> Vec<SuggestedTask> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks_for_employee(&self, employee_id: i64) -> Result<Vec<TaskDetails>> {
        if self.fail_history {
            bail!("task table unavailable");
        }
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.employee == employee_id)
            .cloned()
            .collect())
    }

    async fn bulk_insert(&self, tasks: &[SuggestedTask]) -> Result<usize> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            bail!("FOREIGN KEY constraint failed");
        }
        self.inserted.lock().unwrap().extend_from_slice(tasks);
        Ok(tasks.len())
    }
}
