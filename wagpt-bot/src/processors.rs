//! Message processors: turn an incoming message of one kind into user content for the model.
//!
//! The bot keeps one processor per [`MessageKind`] in a [`ProcessorRegistry`]. Applications can
//! swap a processor or wrap the default one (see [`ProcessorRegistry::wrap`]).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use llm_client::LlmClient;
use tracing::{debug, warn};
use wagpt_core::{
    Content, ContentPart, Context, HandlerError, Media, Message, MessageKind, Payload, Result,
    WagptError,
};

/// Prompt used for an image without caption when the model can see images.
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image";

/// Converts a message into the user content appended to the conversation.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    /// Returns [`WagptError::Handler`] when the message carries nothing to send to the model;
    /// the bot skips such messages.
    async fn process(&self, ctx: &Context, message: &Message, model: &dyn LlmClient)
        -> Result<Content>;
}

/// Plain text. Empty or whitespace-only text is skipped.
pub struct TextProcessor;

#[async_trait]
impl MessageProcessor for TextProcessor {
    async fn process(&self, _ctx: &Context, message: &Message, _model: &dyn LlmClient) -> Result<Content> {
        match message.text.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(Content::Text(text.to_string())),
            Some(_) => Err(HandlerError::EmptyContent.into()),
            None => Err(HandlerError::NoText.into()),
        }
    }
}

/// Images: an image part for vision models, a textual note otherwise.
pub struct ImageProcessor;

#[async_trait]
impl MessageProcessor for ImageProcessor {
    async fn process(&self, _ctx: &Context, message: &Message, model: &dyn LlmClient) -> Result<Content> {
        let Payload::Image(media) = &message.payload else {
            return Err(HandlerError::MissingPayload("image").into());
        };
        let caption = media.caption.as_deref().filter(|c| !c.is_empty());

        if model.supports_vision() {
            if let Some(url) = media.download_url.as_deref() {
                return Ok(Content::Parts(vec![
                    ContentPart::text(caption.unwrap_or(DEFAULT_IMAGE_PROMPT)),
                    ContentPart::image_url(url),
                ]));
            }
        }

        Ok(Content::Text(match caption {
            Some(caption) => format!("[The user sent an image with caption: \"{}\"]", caption),
            None => "[The user sent an image]".to_string(),
        }))
    }
}

/// Voice and audio files: downloads the file and asks the model client for a transcription.
pub struct AudioProcessor {
    http: reqwest::Client,
}

impl AudioProcessor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn download(&self, media: &Media) -> Result<Vec<u8>> {
        let url = media
            .download_url
            .as_deref()
            .ok_or(HandlerError::MissingPayload("audio download url"))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| WagptError::Transport(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WagptError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Default for AudioProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageProcessor for AudioProcessor {
    async fn process(&self, _ctx: &Context, message: &Message, model: &dyn LlmClient) -> Result<Content> {
        let Payload::Audio(media) = &message.payload else {
            return Err(HandlerError::MissingPayload("audio").into());
        };
        let file_name = media.file_name.as_deref().unwrap_or("audio.ogg");

        let transcription = match self.download(media).await {
            Ok(bytes) => model
                .transcribe(file_name, bytes)
                .await
                .map_err(|e| WagptError::Model(e.to_string())),
            Err(e) => Err(e),
        };

        Ok(Content::Text(match transcription {
            Ok(text) => {
                debug!(chars = text.len(), "Audio transcribed");
                format!("[Audio message transcription: \"{}\"]", text)
            }
            Err(e) => {
                warn!(message_id = %message.id, error = %e, "Audio transcription failed");
                "[The user sent an audio message that could not be transcribed]".to_string()
            }
        }))
    }
}

/// Documents, locations, contacts and unsupported types: a bracketed description.
pub struct DescriptionProcessor;

#[async_trait]
impl MessageProcessor for DescriptionProcessor {
    async fn process(&self, _ctx: &Context, message: &Message, _model: &dyn LlmClient) -> Result<Content> {
        describe_payload(&message.payload)
            .map(Content::Text)
            .ok_or_else(|| HandlerError::MissingPayload("describable").into())
    }
}

/// Bracketed description of non-text payloads; `None` for text, image and audio.
pub fn describe_payload(payload: &Payload) -> Option<String> {
    match payload {
        Payload::Document(media) => Some(format!(
            "[The user sent a document: \"{}\"]",
            media.file_name.as_deref().unwrap_or("unnamed")
        )),
        Payload::Location(location) => {
            let mut text = format!(
                "[The user shared a location: {}, {}",
                location.latitude, location.longitude
            );
            if let Some(name) = &location.name {
                text.push_str(&format!(" ({})", name));
            }
            text.push(']');
            Some(text)
        }
        Payload::Contact(contact) => Some(format!(
            "[The user shared a contact: {}]",
            contact.display_name
        )),
        Payload::Unsupported { type_message } => Some(format!(
            "[The user sent an unsupported message type: {}]",
            type_message
        )),
        Payload::Text | Payload::Image(_) | Payload::Audio(_) => None,
    }
}

/// Processors keyed by message kind.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<MessageKind, Arc<dyn MessageProcessor>>,
}

impl ProcessorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with a processor for every kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let description: Arc<dyn MessageProcessor> = Arc::new(DescriptionProcessor);
        registry.replace(MessageKind::Text, Arc::new(TextProcessor));
        registry.replace(MessageKind::Image, Arc::new(ImageProcessor));
        registry.replace(MessageKind::Audio, Arc::new(AudioProcessor::new()));
        for kind in [
            MessageKind::Document,
            MessageKind::Location,
            MessageKind::Contact,
            MessageKind::Unsupported,
        ] {
            registry.replace(kind, description.clone());
        }
        registry
    }

    pub fn get(&self, kind: MessageKind) -> Option<Arc<dyn MessageProcessor>> {
        self.processors.get(&kind).cloned()
    }

    /// Installs `processor` for `kind`, returning the previous one.
    pub fn replace(
        &mut self,
        kind: MessageKind,
        processor: Arc<dyn MessageProcessor>,
    ) -> Option<Arc<dyn MessageProcessor>> {
        self.processors.insert(kind, processor)
    }

    /// Replaces the processor for `kind` with one built around the current processor.
    /// Does nothing when no processor is registered for `kind`.
    pub fn wrap<F>(&mut self, kind: MessageKind, build: F)
    where
        F: FnOnce(Arc<dyn MessageProcessor>) -> Arc<dyn MessageProcessor>,
    {
        match self.processors.remove(&kind) {
            Some(current) => {
                self.processors.insert(kind, build(current));
            }
            None => warn!(kind = %kind, "No processor to wrap"),
        }
    }
}
