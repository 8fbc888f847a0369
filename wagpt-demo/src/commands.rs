//! Text commands: `/help`, `/clear`, `/mode`, `/weather`.

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use tracing::info;
use wagpt_core::{ChatRecord, Content, Context, Handler, HandlerResponse, Message, Result, Session};

pub const HELP_TEXT: &str = "*WhatsAppGPT Demo Bot*

Available commands:
- /help - Show this help message
- /clear - Clear conversation history
- /mode [professional|casual|creative] - Change response style
- /weather [location] - Get weather info (demo)

You can also send:
- Text messages
- Images
- Audio messages
- Contacts
- Locations
- Documents

Your data is handled securely and conversations are private.";

pub const MODE_PATTERN: &str = r"(?i)^/mode\s+(professional|casual)$";
pub const WEATHER_PATTERN: &str = r"(?i)^/weather\s+(.+)$";

pub const PROFESSIONAL_PROMPT: &str = "You must start every message with Mister or Missus or \
its equivalent in a user's language. You are a professional assistant. Provide clear, factual, \
and detailed information. Use formal language and be thorough but concise.";

pub const CASUAL_PROMPT: &str = "You must start every message with Bro or Sis or its \
equivalent in a user's language. You are a friendly and casual assistant. Keep your responses \
conversational, light, and easy to understand. Feel free to use simple language and be a bit \
more relaxed.";

pub const WEATHER_CONDITIONS: [&str; 5] =
    ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain", "Heavy Rain"];

pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, _ctx: &Context, _message: &Message, _session: &mut Session) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Reply(HELP_TEXT.to_string()))
    }
}

/// Drops everything but the system record. Returns false when the session has no history yet.
pub fn clear_history(session: &mut Session) -> bool {
    let Some(history) = session.history.as_mut() else {
        return false;
    };
    let system = history.iter().find(|record| record.is_system()).cloned();
    *history = system.into_iter().collect();
    true
}

pub struct ClearHandler;

#[async_trait]
impl Handler for ClearHandler {
    async fn handle(&self, _ctx: &Context, _message: &Message, session: &mut Session) -> Result<HandlerResponse> {
        let reply = if clear_history(session) {
            "✓ Conversation history cleared!"
        } else {
            "No conversation history to clear."
        };
        Ok(HandlerResponse::Reply(reply.to_string()))
    }
}

/// System prompt for a response style; unknown styles get an empty prompt.
pub fn mode_prompt(mode: &str) -> &'static str {
    match mode {
        "professional" => PROFESSIONAL_PROMPT,
        "casual" => CASUAL_PROMPT,
        _ => "",
    }
}

/// Rewrites the system record (or inserts one at the front). Returns false when the session
/// has no history yet.
pub fn apply_mode(session: &mut Session, prompt: &str) -> bool {
    let Some(history) = session.history.as_mut() else {
        return false;
    };
    match history.iter_mut().find(|record| record.is_system()) {
        Some(record) => record.content = Content::Text(prompt.to_string()),
        None => history.insert(0, ChatRecord::system(prompt)),
    }
    true
}

pub struct ModeHandler {
    pattern: Regex,
}

impl ModeHandler {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(MODE_PATTERN)?,
        })
    }
}

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, _ctx: &Context, message: &Message, session: &mut Session) -> Result<HandlerResponse> {
        let Some(captures) = message
            .text
            .as_deref()
            .and_then(|text| self.pattern.captures(text.trim()))
        else {
            return Ok(HandlerResponse::Stop);
        };
        let mode = captures[1].to_lowercase();

        if !apply_mode(session, mode_prompt(&mode)) {
            info!(chat_id = %message.chat_id, mode = %mode, "No history yet, mode not applied");
            return Ok(HandlerResponse::Stop);
        }
        info!(chat_id = %message.chat_id, mode = %mode, "Mode switched");
        Ok(HandlerResponse::Reply(format!(
            "Mode switched to *{}* style! 🎭",
            mode
        )))
    }
}

/// Simulated weather report for `location`.
pub fn weather_report<R: Rng + ?Sized>(location: &str, rng: &mut R) -> String {
    let temperature = rng.gen_range(10..=35);
    let condition = WEATHER_CONDITIONS[rng.gen_range(0..WEATHER_CONDITIONS.len())];
    let humidity = rng.gen_range(40..=80);
    let wind = rng.gen_range(5..=25);
    format!(
        "*Weather for {}*\nTemperature: {}°C\nCondition: {}\nHumidity: {}%\nWind: {} km/h\n\n\
         _Note: This is simulated data for demonstration purposes._",
        location, temperature, condition, humidity, wind
    )
}

pub struct WeatherHandler {
    pattern: Regex,
}

impl WeatherHandler {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(WEATHER_PATTERN)?,
        })
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    async fn handle(&self, _ctx: &Context, message: &Message, _session: &mut Session) -> Result<HandlerResponse> {
        let Some(captures) = message
            .text
            .as_deref()
            .and_then(|text| self.pattern.captures(text.trim()))
        else {
            return Ok(HandlerResponse::Stop);
        };
        let report = weather_report(&captures[1], &mut rand::thread_rng());
        Ok(HandlerResponse::Reply(report))
    }
}
