//! Transport abstraction: outbound text ([`Bot`]) and the inbound notification queue ([`Inbox`]).
//!
//! Implementations map to a messaging provider (e.g. GREEN-API); tests substitute in-memory mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// Sends messages to chats.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat. Returns the transport message id.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<String>;

    /// Checks the account is ready to send and receive (e.g. instance authorised).
    async fn check_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// One entry taken from the inbound queue. `message` is `None` for events that are not
/// incoming chat messages (status updates, outgoing echoes, ...).
#[derive(Debug, Clone)]
pub struct Notification {
    pub receipt_id: u64,
    pub message: Option<Message>,
}

/// Inbound notification queue (long-poll style: receive, then acknowledge).
#[async_trait]
pub trait Inbox: Send + Sync {
    /// Waits for the next notification; `None` when the poll timed out with an empty queue.
    async fn receive(&self) -> Result<Option<Notification>>;

    /// Removes a received notification from the queue.
    async fn acknowledge(&self, receipt_id: u64) -> Result<()>;
}
