use crate::core::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("suggestion service unavailable after {attempts} attempt(s): {source}")]
    UpstreamUnavailable {
        attempts: u32,
        #[source]
        source: LlmError,
    },
    #[error("failed to load task history for employee {employee_id}: {reason}")]
    TaskHistory { employee_id: i64, reason: String },
}
