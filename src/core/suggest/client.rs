use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::SuggestionError;
use crate::core::llm::{ChatMessage, LlmError, LlmProvider};

pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Sends a single-message completion request, retrying transient failures
/// with exponential backoff.
pub struct SuggestionClient {
    provider: Arc<dyn LlmProvider>,
    settings: ClientSettings,
}

impl SuggestionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ClientSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.settings
            .retry_backoff
            .saturating_mul(factor)
            .min(MAX_BACKOFF)
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let call = self
            .provider
            .generate(&self.settings.model, messages, self.settings.max_tokens);
        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.settings.timeout)),
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, SuggestionError> {
        let messages = [ChatMessage::user(prompt)];
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(&messages).await {
                Ok(text) => {
                    info!(
                        "Completion from {} ({} chars, attempt {})",
                        self.provider.provider_id(),
                        text.len(),
                        attempts
                    );
                    return Ok(text);
                }
                Err(err) if err.is_transient() && attempts <= self.settings.max_retries => {
                    let delay = self.backoff(attempts);
                    warn!(
                        "Completion attempt {} failed: {}. Retrying in {:?}",
                        attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(source) => {
                    warn!("Completion failed after {} attempt(s): {}", attempts, source);
                    return Err(SuggestionError::UpstreamUnavailable { attempts, source });
                }
            }
        }
    }
}
