//! # wagpt-bot
//!
//! WhatsApp GPT bot engine over GREEN-API and OpenAI. [`WhatsappGptBot`] keeps one session per
//! chat, runs registered handlers, converts other messages with a per-kind
//! [`MessageProcessor`], passes them through message middleware, the model and response
//! middleware, and sends the reply.

mod bot;
mod config;
mod history;
mod processors;
mod runner;
mod session;

pub use bot::{WhatsappGptBot, MODEL_ERROR_REPLY};
pub use config::GptBotConfig;
pub use history::cap_history;
pub use processors::{
    describe_payload, AudioProcessor, DescriptionProcessor, ImageProcessor, MessageProcessor,
    ProcessorRegistry, TextProcessor, DEFAULT_IMAGE_PROMPT,
};
pub use runner::{POLL_RETRY_DELAY, SESSION_SWEEP_INTERVAL};
pub use session::SessionStore;

pub use llm_client::LlmClient;
