//! Handler triggers: exact text, regular expression, payload type.

use regex::Regex;
use wagpt_core::{Message, MessageKind};

/// Condition under which a handler runs. Text triggers only look at text messages and compare
/// against the trimmed text.
#[derive(Debug, Clone)]
pub enum Trigger {
    Exact(String),
    Regex(Regex),
    Kind(MessageKind),
}

impl Trigger {
    pub fn exact(text: impl Into<String>) -> Self {
        Trigger::Exact(text.into())
    }

    /// Compiles `pattern`; fails on invalid syntax.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Trigger::Regex(Regex::new(pattern)?))
    }

    pub fn kind(kind: MessageKind) -> Self {
        Trigger::Kind(kind)
    }

    pub fn matches(&self, message: &Message) -> bool {
        match self {
            Trigger::Exact(expected) => text_of(message).is_some_and(|text| text == expected),
            Trigger::Regex(regex) => text_of(message).is_some_and(|text| regex.is_match(text)),
            Trigger::Kind(kind) => message.kind() == *kind,
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Trigger::Exact(text) => format!("text:{}", text),
            Trigger::Regex(regex) => format!("regex:{}", regex.as_str()),
            Trigger::Kind(kind) => format!("type:{}", kind),
        }
    }
}

fn text_of(message: &Message) -> Option<&str> {
    if message.kind() != MessageKind::Text {
        return None;
    }
    message.text.as_deref().map(str::trim)
}
