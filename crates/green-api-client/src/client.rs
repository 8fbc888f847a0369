//! GREEN-API REST client and its [`Bot`]/[`Inbox`] implementations.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use wagpt_core::{Bot, Inbox, Notification, Result, WagptError};

use crate::config::GreenApiConfig;
use crate::notification::{to_message, RawNotification};

/// State reported by `getStateInstance` when the instance can send and receive.
pub const STATE_AUTHORIZED: &str = "authorized";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    id_message: String,
}

#[derive(Debug, Deserialize)]
struct DeleteNotificationResponse {
    result: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateInstanceResponse {
    state_instance: String,
}

/// Client for one GREEN-API instance.
#[derive(Clone)]
pub struct GreenApiClient {
    http: Client,
    config: GreenApiConfig,
}

impl GreenApiClient {
    pub fn new(config: GreenApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GreenApiConfig {
        &self.config
    }

    /// Sends a text message; returns the GREEN-API message id.
    #[instrument(skip(self, message))]
    pub async fn send_message(&self, chat_id: &str, message: &str) -> Result<String> {
        let response = self
            .http
            .post(self.config.method_url("sendMessage"))
            .json(&json!({ "chatId": chat_id, "message": message }))
            .send()
            .await
            .map_err(transport)?;
        let body: SendMessageResponse = read_json("sendMessage", response).await?;
        Ok(body.id_message)
    }

    /// Takes the oldest notification from the queue, waiting up to the configured receive
    /// timeout. `None` when the queue stayed empty.
    pub async fn receive_notification(&self) -> Result<Option<RawNotification>> {
        let response = self
            .http
            .get(self.config.method_url("receiveNotification"))
            .query(&[("receiveTimeout", self.config.receive_timeout_secs)])
            .send()
            .await
            .map_err(transport)?;
        read_json("receiveNotification", response).await
    }

    /// Removes a notification from the queue. Returns the API's `result` flag.
    #[instrument(skip(self))]
    pub async fn delete_notification(&self, receipt_id: u64) -> Result<bool> {
        let url = format!(
            "{}/{}",
            self.config.method_url("deleteNotification"),
            receipt_id
        );
        let response = self.http.delete(url).send().await.map_err(transport)?;
        let body: DeleteNotificationResponse = read_json("deleteNotification", response).await?;
        Ok(body.result)
    }

    /// Instance state, e.g. `authorized`, `notAuthorized`, `blocked`.
    pub async fn get_state_instance(&self) -> Result<String> {
        let response = self
            .http
            .get(self.config.method_url("getStateInstance"))
            .send()
            .await
            .map_err(transport)?;
        let body: StateInstanceResponse = read_json("getStateInstance", response).await?;
        Ok(body.state_instance)
    }
}

fn transport(e: reqwest::Error) -> WagptError {
    WagptError::Transport(e.to_string())
}

async fn read_json<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(WagptError::Transport(format!(
            "GREEN-API {} returned {}: {}",
            method, status, text
        )));
    }
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl Bot for GreenApiClient {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<String> {
        self.send_message(chat_id, text).await
    }

    async fn check_ready(&self) -> Result<()> {
        let state = self.get_state_instance().await?;
        info!(id_instance = %self.config.id_instance, state = %state, "GREEN-API instance state");
        if state != STATE_AUTHORIZED {
            return Err(WagptError::Transport(format!(
                "instance {} is not authorized (state: {})",
                self.config.id_instance, state
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Inbox for GreenApiClient {
    async fn receive(&self) -> Result<Option<Notification>> {
        let Some(raw) = self.receive_notification().await? else {
            return Ok(None);
        };
        let message = match to_message(&raw.body) {
            Ok(message) => message,
            Err(e) => {
                warn!(receipt_id = raw.receipt_id, error = %e, "Unrecognised notification body");
                None
            }
        };
        debug!(
            receipt_id = raw.receipt_id,
            has_message = message.is_some(),
            "Received notification"
        );
        Ok(Some(Notification {
            receipt_id: raw.receipt_id,
            message,
        }))
    }

    async fn acknowledge(&self, receipt_id: u64) -> Result<()> {
        if !self.delete_notification(receipt_id).await? {
            warn!(receipt_id, "deleteNotification returned false");
        }
        Ok(())
    }
}
