//! OpenAI implementation of [`LlmClient`]: wraps openai-client and converts history records.

use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;
use wagpt_core::ChatRecord;

use super::{record_to_openai, LlmClient};

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Whether `model` accepts image input.
pub fn model_supports_vision(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    model.starts_with("gpt-4o")
        || model.starts_with("gpt-4-turbo")
        || model.starts_with("gpt-4.1")
        || model.starts_with("o1")
        || model.contains("vision")
}

/// [`LlmClient`] backed by openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, history), fields(model = %self.model, records = history.len()))]
    async fn complete(&self, history: &[ChatRecord], temperature: f32) -> Result<String> {
        let messages = history
            .iter()
            .map(record_to_openai)
            .collect::<Result<Vec<_>>>()?;
        self.client
            .chat_completion(&self.model, messages, Some(temperature))
            .await
    }

    #[instrument(skip(self, bytes))]
    async fn transcribe(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        self.client.transcribe(file_name, bytes).await
    }

    fn supports_vision(&self) -> bool {
        model_supports_vision(&self.model)
    }
}
