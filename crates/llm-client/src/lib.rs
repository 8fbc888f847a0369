//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI implementation. Works on
//! [`wagpt_core::ChatRecord`] history so the bot never touches API message types.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, ImageUrlArgs,
};
use wagpt_core::{ChatRecord, Content, ContentPart, Role};

mod openai_llm;

pub use openai_llm::{model_supports_vision, OpenAILlmClient};

/// LLM client interface: completion over a full history, plus audio transcription.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply for `history` (system record included by the caller).
    async fn complete(&self, history: &[ChatRecord], temperature: f32) -> Result<String>;

    /// Transcribes an audio file to text.
    async fn transcribe(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;

    /// Whether the model accepts image parts in user content.
    fn supports_vision(&self) -> bool;
}

/// Converts one history record into the OpenAI API message format. Structured content is only
/// meaningful for user records; system/assistant parts are flattened to their text.
fn record_to_openai(record: &ChatRecord) -> Result<ChatCompletionRequestMessage> {
    let message: ChatCompletionRequestMessage = match record.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(flatten_text(&record.content))
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(flatten_text(&record.content))
            .build()?
            .into(),
        Role::User => {
            let content = match &record.content {
                Content::Text(text) => ChatCompletionRequestUserMessageContent::Text(text.clone()),
                Content::Parts(parts) => ChatCompletionRequestUserMessageContent::Array(
                    parts.iter().map(part_to_openai).collect::<Result<Vec<_>>>()?,
                ),
            };
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()?
                .into()
        }
    };
    Ok(message)
}

fn part_to_openai(part: &ContentPart) -> Result<ChatCompletionRequestUserMessageContentPart> {
    Ok(match part {
        ContentPart::Text { text } => ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(text.clone())
                .build()?,
        ),
        ContentPart::ImageUrl { image_url } => {
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(ImageUrlArgs::default().url(image_url.url.clone()).build()?)
                    .build()?,
            )
        }
    })
}

fn flatten_text(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_text_drops_images() {
        let content = Content::Parts(vec![
            ContentPart::text("first"),
            ContentPart::image_url("https://example.com/a.jpg"),
            ContentPart::text("second"),
        ]);
        assert_eq!(flatten_text(&content), "first\nsecond");
        assert_eq!(flatten_text(&Content::from("plain")), "plain");
    }

    #[test]
    fn test_record_to_openai_roles() {
        let system = record_to_openai(&ChatRecord::system("be brief")).unwrap();
        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));

        let assistant = record_to_openai(&ChatRecord::assistant("ok")).unwrap();
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));

        let user = record_to_openai(&ChatRecord::user(Content::Parts(vec![
            ContentPart::text("Describe this image"),
            ContentPart::image_url("https://example.com/cat.jpg"),
        ])))
        .unwrap();
        match user {
            ChatCompletionRequestMessage::User(msg) => match msg.content {
                ChatCompletionRequestUserMessageContent::Array(parts) => assert_eq!(parts.len(), 2),
                other => panic!("expected array content, got {:?}", other),
            },
            other => panic!("expected user message, got {:?}", other),
        }
    }
}
