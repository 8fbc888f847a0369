//! # green-api-client
//!
//! WhatsApp transport over GREEN-API: instance config, REST client (send message, notification
//! queue, instance state), notification-to-message adapters, and the [`wagpt_core::Bot`] /
//! [`wagpt_core::Inbox`] implementations the bot runner uses.

mod client;
mod config;
mod notification;

pub use client::{GreenApiClient, STATE_AUTHORIZED};
pub use config::{GreenApiConfig, DEFAULT_API_URL, DEFAULT_RECEIVE_TIMEOUT_SECS};
pub use notification::{to_message, RawNotification, INCOMING_MESSAGE_RECEIVED};
