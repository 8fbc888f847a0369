//! Startup and polling loop of [`WhatsappGptBot`].
//!
//! The poll loop hands each message to its chat's worker: one task per active chat that
//! processes that chat's messages in arrival order. A worker idle for the session timeout
//! retires; the next message of the chat starts a new one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use wagpt_core::{Message, Result};

use crate::bot::WhatsappGptBot;

/// Pause before polling again after a failed receive.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How often the poll loop drops sessions idle longer than the session timeout.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) type ChatSender = mpsc::UnboundedSender<Message>;

impl WhatsappGptBot {
    /// Checks the transport is ready and, when configured, drops notifications queued while
    /// the bot was offline.
    pub async fn connect(&self) -> Result<()> {
        self.ctx.bot().check_ready().await?;
        if self.ctx.settings().clear_webhook_queue_on_start {
            let dropped = self.clear_queue().await?;
            info!(dropped, "Cleared notification queue");
        }
        Ok(())
    }

    /// Acknowledges queued notifications without processing them until the queue is empty.
    pub async fn clear_queue(&self) -> Result<usize> {
        let mut dropped = 0;
        while let Some(notification) = self.inbox.receive().await? {
            self.inbox.acknowledge(notification.receipt_id).await?;
            dropped += 1;
        }
        Ok(dropped)
    }

    /// Polls notifications until [`WhatsappGptBot::stop`] is called. Every notification is
    /// acknowledged; messages of one chat are processed in arrival order, different chats in
    /// parallel.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("step: polling notifications");
        let mut last_sweep = Instant::now();
        loop {
            if last_sweep.elapsed() >= SESSION_SWEEP_INTERVAL {
                self.sweep_sessions().await;
                last_sweep = Instant::now();
            }

            let received = tokio::select! {
                _ = self.ctx.cancelled() => break,
                received = self.inbox.receive() => received,
            };

            let notification = match received {
                Ok(Some(notification)) => notification,
                Ok(None) => continue,
                Err(e) => {
                    error!(error = %e, "Failed to receive notification");
                    tokio::select! {
                        _ = self.ctx.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
            };

            if let Err(e) = self.inbox.acknowledge(notification.receipt_id).await {
                warn!(receipt_id = notification.receipt_id, error = %e, "Failed to acknowledge notification");
            }
            let Some(message) = notification.message else {
                debug!(receipt_id = notification.receipt_id, "Skipped non-message notification");
                continue;
            };

            self.dispatch(message);
        }
        info!("Polling stopped");
        Ok(())
    }

    /// Queues `message` on its chat's worker, starting one if the chat has none. The send
    /// happens under the map entry so a retiring worker never drops a queued message.
    fn dispatch(self: &Arc<Self>, message: Message) {
        let chat_id = message.chat_id.clone();
        let mut worker = self
            .chat_workers
            .entry(chat_id.clone())
            .or_insert_with(|| self.spawn_chat_worker(chat_id.clone()));
        if let Err(mpsc::error::SendError(message)) = worker.send(message) {
            warn!(chat_id = %chat_id, "Chat worker stopped unexpectedly, restarting");
            *worker = self.spawn_chat_worker(chat_id);
            if worker.send(message).is_err() {
                error!("Failed to queue message for chat worker");
            }
        }
    }

    fn spawn_chat_worker(self: &Arc<Self>, chat_id: String) -> ChatSender {
        let (tx, rx) = mpsc::unbounded_channel();
        debug!(chat_id = %chat_id, "Starting chat worker");
        tokio::spawn(Arc::clone(self).chat_worker(chat_id, rx));
        tx
    }

    async fn chat_worker(self: Arc<Self>, chat_id: String, mut rx: mpsc::UnboundedReceiver<Message>) {
        let idle = self.ctx.settings().session_timeout;
        loop {
            match tokio::time::timeout(idle, rx.recv()).await {
                Ok(Some(message)) => {
                    if let Err(e) = self.process_message(message).await {
                        error!(chat_id = %chat_id, error = %e, "Failed to process message");
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    // Only retire with nothing queued; dispatch cannot send while the entry is held.
                    if self
                        .chat_workers
                        .remove_if(&chat_id, |_, _| rx.is_empty())
                        .is_some()
                    {
                        break;
                    }
                }
            }
        }
        debug!(chat_id = %chat_id, "Chat worker retired");
    }

    /// Drops sessions idle longer than the session timeout.
    pub async fn sweep_sessions(&self) -> usize {
        let evicted = self
            .sessions()
            .evict_idle(self.ctx.settings().session_timeout)
            .await;
        if evicted > 0 {
            let remaining = self.sessions().len().await;
            info!(evicted, remaining, "Evicted idle sessions");
        }
        evicted
    }

    /// [`WhatsappGptBot::connect`] followed by [`WhatsappGptBot::run`].
    pub async fn start(self: Arc<Self>) -> Result<()> {
        self.connect().await?;
        info!("Bot started");
        self.run().await
    }

    /// Stops polling. Messages already queued on chat workers run to completion.
    pub fn stop(&self) {
        info!("Stop requested");
        self.ctx.shutdown();
    }
}
