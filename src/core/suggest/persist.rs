use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{SuggestedTask, TaskDraft, TaskStore};

/// What happened when suggestions were written back. Storage failures are
/// reported here instead of failing the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    Saved { saved: usize },
    NothingToSave,
    Failed { reason: String },
}

impl PersistOutcome {
    pub fn saved_count(&self) -> usize {
        match self {
            PersistOutcome::Saved { saved } => *saved,
            _ => 0,
        }
    }
}

pub struct SuggestionPersister {
    store: Arc<dyn TaskStore>,
}

impl SuggestionPersister {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn persist(&self, employee_id: i64, drafts: &[TaskDraft]) -> PersistOutcome {
        if drafts.is_empty() {
            return PersistOutcome::NothingToSave;
        }

        let assigned_at = Utc::now();
        let tasks: Vec<SuggestedTask> = drafts
            .iter()
            .map(|draft| SuggestedTask::from_draft(draft, employee_id, assigned_at))
            .collect();

        match self.store.bulk_insert(&tasks).await {
            Ok(saved) => {
                info!("Saved {} suggested task(s) for employee {}", saved, employee_id);
                PersistOutcome::Saved { saved }
            }
            Err(e) => {
                warn!(
                    "Failed to save suggested tasks for employee {}: {}",
                    employee_id, e
                );
                PersistOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
