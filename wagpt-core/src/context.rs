//! Bot context handed to every handler and middleware: immutable settings, transport, shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{error, info};

use crate::bot::Bot;
use crate::error::Result;

/// Model and routing settings of a bot instance. Fixed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GptSettings {
    pub model: String,
    pub system_message: String,
    /// Maximum number of history records kept per session (system record included).
    pub max_history_length: usize,
    pub temperature: f32,
    /// Run registered handlers before routing a message to the model.
    pub handlers_first: bool,
    /// Drop notifications queued while the bot was offline.
    pub clear_webhook_queue_on_start: bool,
    /// A chat idle this long loses its session (and history) and its worker task.
    pub session_timeout: Duration,
}

impl Default for GptSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            system_message: "You are a helpful WhatsApp assistant.".to_string(),
            max_history_length: 10,
            temperature: 0.5,
            handlers_first: true,
            clear_webhook_queue_on_start: false,
            session_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Explicit bot context; cheap to clone (shared settings, transport and shutdown token).
#[derive(Clone)]
pub struct Context {
    settings: Arc<GptSettings>,
    bot: Arc<dyn Bot>,
    shutdown: CancellationToken,
}

impl Context {
    pub fn new(settings: GptSettings, bot: Arc<dyn Bot>) -> Self {
        Self {
            settings: Arc::new(settings),
            bot,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &GptSettings {
        &self.settings
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.bot
    }

    /// Sends text to a chat. The single outbound operation every handler funnels through.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        match self.bot.send_text(chat_id, text).await {
            Ok(message_id) => {
                info!(chat_id = %chat_id, message_id = %message_id, reply_len = text.len(), "Sent text");
                Ok(())
            }
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send text");
                Err(e)
            }
        }
    }

    /// Requests shutdown; the runner stops polling for new work.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once [`Context::shutdown`] has been called.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }
}
