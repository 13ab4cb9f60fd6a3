//! Mock provider implementation for testing.

use super::{Prompt, ProviderError, TextProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned outcome returned by [`MockTextProvider`] on every call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(Option<String>),
    Upstream { status: StatusCode, body: Value },
    NetworkFailure(String),
}

/// Mock text provider that records how it was called.
pub struct MockTextProvider {
    reply: MockReply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
}

impl MockTextProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(MockReply::Text(Some(text.to_string())))
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.clone());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Upstream { status, body } => Err(ProviderError::Upstream {
                status: *status,
                body: body.clone(),
            }),
            MockReply::NetworkFailure(message) => Err(ProviderError::Network(message.clone())),
        }
    }
}
