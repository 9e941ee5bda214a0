//! OpenAI-compatible backend implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint exposing `/v1/chat/completions`. The whole ReAct prompt is
//! sent as a single user message; the reasoning engine owns all
//! structure above the text level.

use async_trait::async_trait;
use futures::StreamExt;
use loresmith_core::backend::{Completion, LlmBackend};
use loresmith_core::error::BackendError;
use serde::Deserialize;
use tracing::{debug, trace, warn};

/// An OpenAI-compatible LLM backend.
pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// OpenAI convenience constructor.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Ollama convenience constructor. Ollama ignores the API key.
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama",
            model,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &str, temperature: f32, max_tokens: Option<u32>, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
            "stream": stream,
        });
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    fn check_status(status: u16, body: String) -> Result<(), BackendError> {
        match status {
            200 => Ok(()),
            429 => Err(BackendError::RateLimited {
                retry_after_secs: 5,
            }),
            401 | 403 => Err(BackendError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            )),
            404 => Err(BackendError::ModelNotFound(body)),
            _ => {
                warn!(status, body = %body, "Backend returned error");
                Err(BackendError::ApiError {
                    status_code: status,
                    message: body,
                })
            }
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<Completion, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt, temperature, max_tokens, false);

        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            Self::check_status(status, error_body)?;
            unreachable!("check_status always errors for non-200 status");
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| BackendError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| BackendError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            model: Some(api_response.model),
        })
    }

    async fn stream(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<String, BackendError>>, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt, temperature, max_tokens, true);

        debug!(backend = %self.name, model = %self.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            Self::check_status(status, error_body)?;
            unreachable!("check_status always errors for non-200 status");
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let backend_name = self.name.clone();

        // Read the SSE byte stream and forward content deltas.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(BackendError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete lines; a partial line stays buffered.
                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        let data = data.trim();
                        if data == "[DONE]" {
                            return;
                        }

                        match serde_json::from_str::<StreamResponse>(data) {
                            Ok(stream_resp) => {
                                if let Some(content) = stream_resp
                                    .choices
                                    .first()
                                    .and_then(|c| c.delta.content.clone())
                                    && !content.is_empty()
                                    && tx.send(Ok(content)).await.is_err()
                                {
                                    return;
                                }
                            }
                            Err(e) => {
                                trace!(
                                    backend = %backend_name,
                                    data = %data,
                                    error = %e,
                                    "Ignoring unparseable SSE chunk"
                                );
                            }
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

// --- Streaming SSE types ---

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let backend = OpenAiCompatBackend::openai("sk-test", "gpt-4o-mini");
        assert_eq!(backend.name(), "openai");
        assert!(backend.base_url.contains("api.openai.com"));
        assert_eq!(backend.model(), "gpt-4o-mini");
    }

    #[test]
    fn ollama_constructor() {
        let backend = OpenAiCompatBackend::ollama(None, "qwen2.5:7b");
        assert_eq!(backend.name(), "ollama");
        assert!(backend.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let backend = OpenAiCompatBackend::new("x", "http://host/v1/", "k", "m");
        assert_eq!(backend.base_url, "http://host/v1");
    }

    #[test]
    fn request_body_shape() {
        let backend = OpenAiCompatBackend::ollama(None, "qwen2.5:7b");
        let body = backend.request_body("Thought:", 0.7, Some(512), false);
        assert_eq!(body["model"], "qwen2.5:7b");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Thought:");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn request_body_omits_max_tokens_when_unset() {
        let backend = OpenAiCompatBackend::ollama(None, "m");
        let body = backend.request_body("p", 0.7, None, true);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            OpenAiCompatBackend::check_status(429, String::new()),
            Err(BackendError::RateLimited { .. })
        ));
        assert!(matches!(
            OpenAiCompatBackend::check_status(401, String::new()),
            Err(BackendError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            OpenAiCompatBackend::check_status(404, "no such model".into()),
            Err(BackendError::ModelNotFound(_))
        ));
        assert!(matches!(
            OpenAiCompatBackend::check_status(500, "boom".into()),
            Err(BackendError::ApiError {
                status_code: 500,
                ..
            })
        ));
        assert!(OpenAiCompatBackend::check_status(200, String::new()).is_ok());
    }

    // --- SSE parsing tests ---

    #[test]
    fn parse_stream_content_delta() {
        let data = r#"{"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        let parsed: StreamResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn parse_stream_finish_chunk() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let parsed: StreamResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices[0].delta.content.is_none());
    }

    #[test]
    fn parse_response_body() {
        let data = r#"{
            "model": "qwen2.5:7b",
            "choices": [{"message": {"role": "assistant", "content": "Final Answer: 4"}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "qwen2.5:7b");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Final Answer: 4")
        );
    }
}
