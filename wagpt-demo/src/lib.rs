//! # wagpt-demo
//!
//! GREEN-API WhatsApp GPT demo bot. [`register`] installs the demo commands, media handlers,
//! the enhanced image processor and the middleware on a [`WhatsappGptBot`]; [`build_bot`]
//! builds a registered bot from [`DemoConfig`].

pub mod commands;
pub mod config;
pub mod image;
pub mod media;
pub mod middleware;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use wagpt_bot::WhatsappGptBot;
use wagpt_core::MessageKind;

pub use config::{demo_settings, DemoConfig};

use commands::{ClearHandler, HelpHandler, ModeHandler, WeatherHandler, MODE_PATTERN, WEATHER_PATTERN};
use image::EnhancedImageProcessor;
use media::{DocumentHandler, LocationHandler};
use middleware::{
    LoggingMessageMiddleware, LoggingResponseMiddleware, ModerationMiddleware,
    SignatureMiddleware, TimeContextMiddleware,
};

/// Registers handlers, the image processor and middleware, in that order.
pub fn register(bot: &mut WhatsappGptBot) -> Result<()> {
    bot.on_text("/help", Arc::new(HelpHandler))
        .on_text("/clear", Arc::new(ClearHandler));
    bot.on_regex(MODE_PATTERN, Arc::new(ModeHandler::new()?))?
        .on_regex(WEATHER_PATTERN, Arc::new(WeatherHandler::new()?))?;
    bot.on_type(MessageKind::Location, Arc::new(LocationHandler))
        .on_type(MessageKind::Document, Arc::new(DocumentHandler));

    bot.replace_processor(MessageKind::Image, |inner| {
        Arc::new(EnhancedImageProcessor::new(inner))
    });

    bot.add_message_middleware(Arc::new(LoggingMessageMiddleware))
        .add_response_middleware(Arc::new(LoggingResponseMiddleware))
        .add_message_middleware(Arc::new(TimeContextMiddleware::new()?))
        .add_message_middleware(Arc::new(ModerationMiddleware))
        .add_response_middleware(Arc::new(SignatureMiddleware));

    info!("Demo handlers and middleware registered");
    Ok(())
}

/// GREEN-API + OpenAI bot with the demo registered.
pub fn build_bot(config: &DemoConfig) -> Result<WhatsappGptBot> {
    let mut bot = WhatsappGptBot::from_config(config.bot_config())?;
    register(&mut bot)?;
    Ok(bot)
}
