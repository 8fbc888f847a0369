//! Message middleware (logging, time context, moderation) and response middleware (logging,
//! signature).

use async_trait::async_trait;
use chrono::{Local, SecondsFormat, Utc};
use regex::{NoExpand, Regex};
use tracing::info;
use wagpt_core::{
    Content, Context, Message, MessageMiddleware, MessageStage, ResponseMiddleware, ResponseStage,
    Result, Session,
};

pub const TIME_PREFIX: &str = "Current time:";
const TIME_LINE_PATTERN: &str = r"(?m)Current time:.*$";
/// `M/D/YYYY, h:mm:ss AM`
const TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub const MODERATION_KEYWORDS: [&str; 3] = ["stupid", "bad", "awful"];
pub const MODERATION_NOTICE: &str =
    "[This message was flagged by content moderation. Please use appropriate language.]";

pub const SIGNATURE: &str = "— GREEN-API WhatsApp GPT bot";

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct LoggingMessageMiddleware;

#[async_trait]
impl MessageMiddleware for LoggingMessageMiddleware {
    async fn process(
        &self,
        _ctx: &Context,
        message: &Message,
        stage: MessageStage,
        _session: &Session,
    ) -> Result<MessageStage> {
        info!(
            at = %timestamp(),
            chat_id = %message.chat_id,
            content = %stage.content.render(),
            "User message"
        );
        Ok(stage)
    }
}

/// Appends a `Current time: <now>` line to `system_text`, or replaces the first existing one.
pub fn with_time_context(pattern: &Regex, system_text: &str, now: &str) -> String {
    let line = format!("{} {}", TIME_PREFIX, now);
    if system_text.contains(TIME_PREFIX) {
        pattern.replace(system_text, NoExpand(&line)).into_owned()
    } else {
        format!("{}\n{}", system_text, line)
    }
}

pub struct TimeContextMiddleware {
    pattern: Regex,
}

impl TimeContextMiddleware {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(TIME_LINE_PATTERN)?,
        })
    }
}

#[async_trait]
impl MessageMiddleware for TimeContextMiddleware {
    async fn process(
        &self,
        _ctx: &Context,
        _message: &Message,
        mut stage: MessageStage,
        _session: &Session,
    ) -> Result<MessageStage> {
        if let Some(record) = stage.history.iter_mut().find(|r| r.is_system()) {
            if let Content::Text(text) = &record.content {
                let now = Local::now().format(TIME_FORMAT).to_string();
                let updated = with_time_context(&self.pattern, text, &now);
                record.content = Content::Text(updated);
            }
        }
        Ok(stage)
    }
}

/// First moderation keyword found in `text`, case-insensitively.
pub fn flagged_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    MODERATION_KEYWORDS
        .into_iter()
        .find(|keyword| lower.contains(keyword))
}

pub struct ModerationMiddleware;

#[async_trait]
impl MessageMiddleware for ModerationMiddleware {
    async fn process(
        &self,
        _ctx: &Context,
        message: &Message,
        mut stage: MessageStage,
        _session: &Session,
    ) -> Result<MessageStage> {
        let keyword = stage.content.as_text().and_then(flagged_keyword);
        if let Some(keyword) = keyword {
            info!(chat_id = %message.chat_id, keyword, "Moderation triggered");
            stage.content = Content::Text(MODERATION_NOTICE.to_string());
        }
        Ok(stage)
    }
}

pub struct LoggingResponseMiddleware;

#[async_trait]
impl ResponseMiddleware for LoggingResponseMiddleware {
    async fn process(
        &self,
        _ctx: &Context,
        stage: ResponseStage,
        session: &Session,
    ) -> Result<ResponseStage> {
        info!(
            at = %timestamp(),
            chat_id = %session.chat_id,
            response = %stage.response,
            "Bot response"
        );
        Ok(stage)
    }
}

/// Appends the signature unless `response` already carries it.
pub fn append_signature(response: String) -> String {
    if response.contains(SIGNATURE) {
        response
    } else {
        format!("{}\n\n{}", response, SIGNATURE)
    }
}

pub struct SignatureMiddleware;

#[async_trait]
impl ResponseMiddleware for SignatureMiddleware {
    async fn process(
        &self,
        _ctx: &Context,
        mut stage: ResponseStage,
        _session: &Session,
    ) -> Result<ResponseStage> {
        stage.response = append_signature(stage.response);
        Ok(stage)
    }
}
