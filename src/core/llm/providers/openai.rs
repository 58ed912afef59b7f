use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::llm::{ChatMessage, LlmError, LlmProvider};

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessageOwned,
}

#[derive(Deserialize)]
struct OpenAiMessageOwned {
    content: Option<String>,
}

/// Any OpenAI-compatible chat completion endpoint (OpenAI, OpenRouter, a
/// local gateway). `endpoint` is the full `/chat/completions` URL.
pub struct OpenAiProvider {
    endpoint: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let req = OpenAiRequest {
            model: model_id,
            messages: messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            max_tokens,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Malformed("response contained no message".to_string()))?;

        if content.trim().is_empty() {
            return Err(LlmError::Malformed("completion text was empty".to_string()));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockState {
        status: StatusCode,
        body: Value,
        delay: Duration,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn mock_completion(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(payload): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        state
            .seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((auth, payload));
        if !state.delay.is_zero() {
            tokio::time::sleep(state.delay).await;
        }
        (state.status, Json(state.body.clone()))
    }

    struct MockServer {
        url: String,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    /// Serve canned completions on a loopback port. `None` when the sandbox
    /// forbids binding sockets.
    async fn start_mock(status: StatusCode, body: Value, delay: Duration) -> Option<MockServer> {
        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(l) => l,
            Err(err) => {
                eprintln!("Skipping provider test: socket bind failed: {err}");
                return None;
            }
        };
        let addr = listener.local_addr().ok()?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body,
            delay,
            seen: Arc::clone(&seen),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(mock_completion))
            .with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Some(MockServer {
            url: format!("http://{addr}/v1/chat/completions"),
            seen,
        })
    }

    fn completion_body(content: &str) -> Value {
        json!({
            "choices": [{
                "message": { "role": "assistant", "content": content }
            }]
        })
    }

    #[tokio::test]
    async fn returns_first_choice_and_sends_model_and_token_bound() {
        let Some(server) = start_mock(
            StatusCode::OK,
            completion_body("Title: Write tests"),
            Duration::ZERO,
        )
        .await
        else {
            return;
        };

        let provider = OpenAiProvider::new(&server.url, "sk-test", Duration::from_secs(5)).unwrap();
        let text = provider
            .generate(
                "openai/gpt-3.5-turbo",
                &[ChatMessage::user("suggest something")],
                500,
            )
            .await
            .unwrap();
        assert_eq!(text, "Title: Write tests");

        let seen = server.seen.lock().unwrap();
        let (auth, payload) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(payload["model"], "openai/gpt-3.5-turbo");
        assert_eq!(payload["max_tokens"], 500);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "suggest something");
    }

    #[tokio::test]
    async fn rate_limit_is_reported_as_transient_http_error() {
        let Some(server) = start_mock(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": "slow down" }),
            Duration::ZERO,
        )
        .await
        else {
            return;
        };

        let provider = OpenAiProvider::new(&server.url, "k", Duration::from_secs(5)).unwrap();
        let err = provider
            .generate("m", &[ChatMessage::user("x")], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http { status: 429, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn missing_choices_is_malformed() {
        let Some(server) =
            start_mock(StatusCode::OK, json!({ "choices": [] }), Duration::ZERO).await
        else {
            return;
        };

        let provider = OpenAiProvider::new(&server.url, "k", Duration::from_secs(5)).unwrap();
        let err = provider
            .generate("m", &[ChatMessage::user("x")], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
    }

    #[tokio::test]
    async fn blank_completion_is_malformed() {
        let Some(server) = start_mock(StatusCode::OK, completion_body("   "), Duration::ZERO).await
        else {
            return;
        };

        let provider = OpenAiProvider::new(&server.url, "k", Duration::from_secs(5)).unwrap();
        let err = provider
            .generate("m", &[ChatMessage::user("x")], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let Some(server) = start_mock(
            StatusCode::OK,
            completion_body("late"),
            Duration::from_secs(3),
        )
        .await
        else {
            return;
        };

        let provider =
            OpenAiProvider::new(&server.url, "k", Duration::from_millis(100)).unwrap();
        let err = provider
            .generate("m", &[ChatMessage::user("x")], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let port = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(l) => l.local_addr().unwrap().port(),
            Err(_) => return,
        };
        let provider = OpenAiProvider::new(
            format!("http://127.0.0.1:{port}/v1/chat/completions"),
            "k",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider
            .generate("m", &[ChatMessage::user("x")], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
        assert!(err.is_transient());
    }
}
