//! Bot configuration: GREEN-API instance, OpenAI credentials and model settings.

use green_api_client::GreenApiConfig;
use wagpt_core::{GptSettings, Result, WagptError};

#[derive(Debug, Clone)]
pub struct GptBotConfig {
    pub green_api: GreenApiConfig,
    pub openai_api_key: String,
    /// `None` uses the OpenAI default endpoint.
    pub openai_base_url: Option<String>,
    pub settings: GptSettings,
}

impl GptBotConfig {
    pub fn new(green_api: GreenApiConfig, openai_api_key: impl Into<String>) -> Self {
        Self {
            green_api,
            openai_api_key: openai_api_key.into(),
            openai_base_url: None,
            settings: GptSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GptSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_openai_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_base_url = Some(base_url.into());
        self
    }

    /// Rejects settings the bot cannot run with. Empty credentials are allowed here; the
    /// remote APIs reject them on first use.
    pub fn validate(&self) -> Result<()> {
        if self.settings.model.trim().is_empty() {
            return Err(WagptError::Config("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.settings.temperature) {
            return Err(WagptError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.settings.temperature
            )));
        }
        if self.settings.session_timeout.is_zero() {
            return Err(WagptError::Config(
                "session_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
