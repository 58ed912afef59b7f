pub mod providers;

use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to completion service failed: {0}")]
    Transport(String),
    #[error("completion service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("completion service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("completion service returned an unusable response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Failures worth another attempt: connectivity, timeouts, rate limits
    /// and server-side errors. Auth failures and bad payloads are final.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(_) | LlmError::Timeout(_) => true,
            LlmError::Http { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            LlmError::Malformed(_) => false,
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    // Run a chat completion and return the first choice's text
    async fn generate(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LlmError::Transport("connection refused".into()).is_transient());
        assert!(LlmError::Timeout(Duration::from_secs(30)).is_transient());
        assert!(
            LlmError::Http {
                status: 429,
                body: "rate limited".into()
            }
            .is_transient()
        );
        assert!(
            LlmError::Http {
                status: 502,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !LlmError::Http {
                status: 401,
                body: "bad key".into()
            }
            .is_transient()
        );
        assert!(!LlmError::Malformed("no choices".into()).is_transient());
    }

    #[test]
    fn user_message_has_user_role() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
    }
}
