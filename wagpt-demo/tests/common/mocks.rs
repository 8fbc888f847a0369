//! Mock transport and model for demo end-to-end tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use wagpt_bot::LlmClient;
use wagpt_core::{Bot, ChatRecord, Inbox, Notification, Result};

/// Bot that forwards every sent text to a channel.
pub struct MockBot {
    sent_tx: mpsc::UnboundedSender<String>,
}

impl MockBot {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { sent_tx }), sent_rx)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_text(&self, _chat_id: &str, text: &str) -> Result<String> {
        let _ = self.sent_tx.send(text.to_string());
        Ok("mock-message-id".to_string())
    }
}

/// Inbox that never has notifications; the tests call `process_message` directly.
pub struct EmptyInbox;

#[async_trait]
impl Inbox for EmptyInbox {
    async fn receive(&self) -> Result<Option<Notification>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(None)
    }

    async fn acknowledge(&self, _receipt_id: u64) -> Result<()> {
        Ok(())
    }
}

/// Model answering `reply-<n>` and recording the history of every call.
#[derive(Default)]
pub struct MockModel {
    pub calls: Mutex<Vec<Vec<ChatRecord>>>,
}

impl MockModel {
    pub fn last_call(&self) -> Vec<ChatRecord> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockModel {
    async fn complete(&self, history: &[ChatRecord], _temperature: f32) -> anyhow::Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(history.to_vec());
        Ok(format!("reply-{}", calls.len()))
    }

    async fn transcribe(&self, _file_name: &str, _bytes: Vec<u8>) -> anyhow::Result<String> {
        anyhow::bail!("transcription not available")
    }

    fn supports_vision(&self) -> bool {
        false
    }
}

/// Waits for the next sent text, failing the test after one second.
pub async fn next_sent(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a sent message")
        .expect("sent channel closed")
}
