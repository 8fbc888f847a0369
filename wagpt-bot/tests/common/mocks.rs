//! Mock transport and model for bot integration tests.
//!
//! [`MockBot`] forwards every sent text to a channel so tests can await replies.
//! [`MockInbox`] serves a fixed queue of notifications and records acknowledgements.
//! [`MockModel`] returns scripted replies and records the history of every call.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use wagpt_bot::LlmClient;
use wagpt_core::{Bot, ChatRecord, Inbox, Message, Notification, Result};

/// One recorded `send_text(chat_id, text)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub chat_id: String,
    pub text: String,
}

pub struct MockBot {
    sent_tx: mpsc::UnboundedSender<SentRecord>,
    ready: bool,
}

impl MockBot {
    /// Creates a ready MockBot and the receiver of its sent texts.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SentRecord>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { sent_tx, ready: true }), sent_rx)
    }

    pub fn not_ready() -> Arc<Self> {
        let (sent_tx, _) = mpsc::unbounded_channel();
        Arc::new(Self { sent_tx, ready: false })
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<String> {
        let _ = self.sent_tx.send(SentRecord {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        Ok("mock-message-id".to_string())
    }

    async fn check_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(wagpt_core::WagptError::Transport("instance is not authorized".to_string()))
        }
    }
}

#[derive(Default)]
pub struct MockInbox {
    queue: Mutex<VecDeque<Notification>>,
    pub acknowledged: Mutex<Vec<u64>>,
}

impl MockInbox {
    pub fn with_messages(messages: Vec<Message>) -> Arc<Self> {
        let queue = messages
            .into_iter()
            .enumerate()
            .map(|(i, message)| Notification {
                receipt_id: i as u64 + 1,
                message: Some(message),
            })
            .collect();
        Arc::new(Self {
            queue: Mutex::new(queue),
            acknowledged: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, notification: Notification) {
        self.queue.lock().unwrap().push_back(notification);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn acknowledged(&self) -> Vec<u64> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Inbox for MockInbox {
    async fn receive(&self) -> Result<Option<Notification>> {
        let next = self.queue.lock().unwrap().pop_front();
        if next.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(next)
    }

    async fn acknowledge(&self, receipt_id: u64) -> Result<()> {
        self.acknowledged.lock().unwrap().push(receipt_id);
        Ok(())
    }
}

/// Model that answers `reply-<n>` (n counts calls from 1) or fails when `failing`.
#[derive(Default)]
pub struct MockModel {
    pub failing: bool,
    pub vision: bool,
    pub calls: Mutex<Vec<Vec<ChatRecord>>>,
}

impl MockModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<Vec<ChatRecord>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockModel {
    async fn complete(&self, history: &[ChatRecord], _temperature: f32) -> anyhow::Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(history.to_vec());
        if self.failing {
            anyhow::bail!("model unavailable");
        }
        Ok(format!("reply-{}", calls.len()))
    }

    async fn transcribe(&self, _file_name: &str, _bytes: Vec<u8>) -> anyhow::Result<String> {
        Ok("transcribed".to_string())
    }

    fn supports_vision(&self) -> bool {
        self.vision
    }
}

/// Waits for the next sent text, failing the test after one second.
pub async fn next_sent(rx: &mut mpsc::UnboundedReceiver<SentRecord>) -> SentRecord {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a sent message")
        .expect("sent channel closed")
}
