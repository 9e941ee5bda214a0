//! Scripted mock backends shared by the engine, reflection, planning
//! and facade tests.

use async_trait::async_trait;
use loresmith_core::backend::{Completion, LlmBackend};
use loresmith_core::error::BackendError;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A backend that replays a fixed script of responses, one per call,
/// repeating the last entry once the script runs out. Prompts received
/// are recorded so tests can assert on what the engine sent.
pub struct SequentialMockBackend {
    script: Vec<String>,
    call_count: Mutex<usize>,
    pub prompts: Mutex<Vec<String>>,
}

impl SequentialMockBackend {
    pub fn new(script: Vec<&str>) -> Self {
        Self {
            script: script.into_iter().map(String::from).collect(),
            call_count: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A script with a single entry.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![text])
    }

    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next_response(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut count = self.call_count.lock().unwrap();
        let index = (*count).min(self.script.len().saturating_sub(1));
        *count += 1;
        self.script.get(index).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmBackend for SequentialMockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _temperature: f32,
        _max_tokens: Option<u32>,
    ) -> Result<Completion, BackendError> {
        Ok(Completion::new(self.next_response(prompt)))
    }

    /// Streams each scripted response in small fragments so marker
    /// detection is exercised across fragment boundaries.
    async fn stream(
        &self,
        prompt: &str,
        _temperature: f32,
        _max_tokens: Option<u32>,
    ) -> Result<mpsc::Receiver<Result<String, BackendError>>, BackendError> {
        let text = self.next_response(prompt);
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let chars: Vec<char> = text.chars().collect();
            for chunk in chars.chunks(7) {
                let fragment: String = chunk.iter().collect();
                if tx.send(Ok(fragment)).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

/// A backend whose every call fails.
pub struct FailingBackend;

#[async_trait]
impl LlmBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _temperature: f32,
        _max_tokens: Option<u32>,
    ) -> Result<Completion, BackendError> {
        Err(BackendError::Network("connection refused".into()))
    }

    async fn stream(
        &self,
        _prompt: &str,
        _temperature: f32,
        _max_tokens: Option<u32>,
    ) -> Result<mpsc::Receiver<Result<String, BackendError>>, BackendError> {
        Err(BackendError::Network("connection refused".into()))
    }
}
