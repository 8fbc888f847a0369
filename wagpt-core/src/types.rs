//! Core types: sender, message payload, model content, history record, session, handler response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Who sent a message (WhatsApp id such as `79001234567@c.us` plus display name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub name: Option<String>,
}

/// Shared location payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub address: Option<String>,
}

/// File payload (image, audio, document). `download_url` points at the transport's file storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub download_url: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
}

/// Shared contact card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub display_name: String,
    pub vcard: Option<String>,
}

/// Typed part of an incoming message. Plain text lives in [`Message::text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Text,
    Image(Media),
    Audio(Media),
    Document(Media),
    Location(Location),
    Contact(Contact),
    Unsupported { type_message: String },
}

/// Message category; key of payload-type triggers and of the processor registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Document,
    Location,
    Contact,
    Unsupported,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Audio => "audio",
            MessageKind::Document => "document",
            MessageKind::Location => "location",
            MessageKind::Contact => "contact",
            MessageKind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single incoming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Transport message id.
    pub id: String,
    /// Chat the message belongs to; replies go here.
    pub chat_id: String,
    pub sender: Sender,
    /// Message text, or the caption for media when the transport provides one.
    pub text: Option<String>,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a plain text message from `chat_id`; sender id equals the chat id (private chat).
    pub fn new_text(id: impl Into<String>, chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        let chat_id = chat_id.into();
        Self {
            id: id.into(),
            sender: Sender {
                id: chat_id.clone(),
                name: None,
            },
            chat_id,
            text: Some(text.into()),
            payload: Payload::Text,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match &self.payload {
            Payload::Text => MessageKind::Text,
            Payload::Image(_) => MessageKind::Image,
            Payload::Audio(_) => MessageKind::Audio,
            Payload::Document(_) => MessageKind::Document,
            Payload::Location(_) => MessageKind::Location,
            Payload::Contact(_) => MessageKind::Contact,
            Payload::Unsupported { .. } => MessageKind::Unsupported,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match &self.payload {
            Payload::Location(location) => Some(location),
            _ => None,
        }
    }

    /// File payload of image, audio or document messages.
    pub fn media(&self) -> Option<&Media> {
        match &self.payload {
            Payload::Image(media) | Payload::Audio(media) | Payload::Document(media) => Some(media),
            _ => None,
        }
    }
}

/// Role of a history record, one-to-one with the chat completion `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Image reference inside structured content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One element of structured (multimodal) content. Serialises like the chat completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Model-facing content: plain text or structured parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Parts(_) => None,
        }
    }

    /// Text as-is; structured content as JSON (for logs).
    pub fn render(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

/// One conversation history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub role: Role,
    pub content: Content,
}

impl ChatRecord {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<Content>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(content.into()),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Per-chat state. `history` is `None` until the first model exchange creates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: String,
    pub history: Option<Vec<ChatRecord>>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            chat_id: chat_id.into(),
            history: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Session whose history already holds `records`.
    pub fn with_history(chat_id: impl Into<String>, records: Vec<ChatRecord>) -> Self {
        let mut session = Self::new(chat_id);
        session.history = Some(records);
        session
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Time since the last [`Session::touch`] (or creation).
    pub fn idle_for(&self) -> Duration {
        (Utc::now() - self.last_activity).to_std().unwrap_or_default()
    }
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Not handled; try the next matching handler, then the model.
    Continue,
    /// Handled; nothing to send.
    Stop,
    /// Handled; the chain sends the text to the message's chat.
    Reply(String),
}
