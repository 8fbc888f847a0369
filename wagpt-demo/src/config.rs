//! Demo config: credentials and endpoints from env (optionally `.env`), fixed model settings.

use anyhow::Result;
use green_api_client::{GreenApiConfig, DEFAULT_API_URL};
use std::env;
use std::time::Duration;
use wagpt_bot::GptBotConfig;
use wagpt_core::GptSettings;

pub const MODEL: &str = "gpt-4o";
pub const MAX_HISTORY_LENGTH: usize = 15;
pub const TEMPERATURE: f32 = 0.5;
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOG_FILE: &str = "logs/wagpt-demo.log";

pub const SYSTEM_PROMPT: &str = "Always answer in a language the user uses to write to you. \
You are a helpful WhatsApp assistant created by a company GREEN-API, the best WhatsApp API \
provider, which allows you to send and receive WhatsApp messages using their API. You can \
process text, images, and audio messages. Be concise but informative in your responses.";

#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// INSTANCE_ID
    pub instance_id: String,
    /// INSTANCE_TOKEN
    pub instance_token: String,
    /// OPENAI_API_KEY
    pub openai_api_key: String,
    /// GREEN_API_URL
    pub green_api_url: String,
    /// OPENAI_BASE_URL
    pub openai_base_url: String,
    /// LOG_FILE; set it empty to log to stdout only.
    pub log_file: Option<String>,
}

impl DemoConfig {
    /// Loads from environment variables. `instance_id` and `token` override INSTANCE_ID and
    /// INSTANCE_TOKEN when provided. Unset credentials default to empty.
    pub fn load(instance_id: Option<String>, token: Option<String>) -> Result<Self> {
        let instance_id =
            instance_id.unwrap_or_else(|| env::var("INSTANCE_ID").unwrap_or_default());
        let instance_token =
            token.unwrap_or_else(|| env::var("INSTANCE_TOKEN").unwrap_or_default());
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let green_api_url =
            env::var("GREEN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let log_file = match env::var("LOG_FILE") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(path),
            Err(_) => Some(DEFAULT_LOG_FILE.to_string()),
        };

        let config = Self {
            instance_id,
            instance_token,
            openai_api_key,
            green_api_url,
            openai_base_url,
            log_file,
        };
        config.validate()?;
        Ok(config)
    }

    /// Endpoint URLs must be http(s).
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("GREEN_API_URL", &self.green_api_url),
            ("OPENAI_BASE_URL", &self.openai_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} is set but not an http(s) URL: {}", name, url);
            }
        }
        Ok(())
    }

    pub fn bot_config(&self) -> GptBotConfig {
        let green_api = GreenApiConfig::new(&self.instance_id, &self.instance_token)
            .with_api_url(&self.green_api_url);
        GptBotConfig::new(green_api, &self.openai_api_key)
            .with_openai_base_url(&self.openai_base_url)
            .with_settings(demo_settings())
    }
}

/// Fixed model and routing settings of the demo.
pub fn demo_settings() -> GptSettings {
    GptSettings {
        model: MODEL.to_string(),
        system_message: SYSTEM_PROMPT.to_string(),
        max_history_length: MAX_HISTORY_LENGTH,
        temperature: TEMPERATURE,
        handlers_first: true,
        clear_webhook_queue_on_start: true,
        session_timeout: SESSION_TIMEOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "INSTANCE_ID",
        "INSTANCE_TOKEN",
        "OPENAI_API_KEY",
        "GREEN_API_URL",
        "OPENAI_BASE_URL",
        "LOG_FILE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults_to_empty_credentials() {
        clear_env();

        let config = DemoConfig::load(None, None).unwrap();

        assert!(config.instance_id.is_empty());
        assert!(config.instance_token.is_empty());
        assert!(config.openai_api_key.is_empty());
        assert_eq!(config.green_api_url, "https://api.green-api.com");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.log_file.as_deref(), Some("logs/wagpt-demo.log"));
    }

    #[test]
    #[serial]
    fn test_empty_log_file_disables_file_logging() {
        clear_env();
        env::set_var("LOG_FILE", "");
        assert_eq!(DemoConfig::load(None, None).unwrap().log_file, None);

        env::set_var("LOG_FILE", "/var/log/wagpt.log");
        assert_eq!(
            DemoConfig::load(None, None).unwrap().log_file.as_deref(),
            Some("/var/log/wagpt.log")
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_and_cli_overrides() {
        clear_env();
        env::set_var("INSTANCE_ID", "1101000001");
        env::set_var("INSTANCE_TOKEN", "env-token");
        env::set_var("OPENAI_API_KEY", "sk-env");
        env::set_var("GREEN_API_URL", "https://7103.api.greenapi.com");

        let config = DemoConfig::load(None, Some("cli-token".to_string())).unwrap();
        assert_eq!(config.instance_id, "1101000001");
        assert_eq!(config.instance_token, "cli-token");
        assert_eq!(config.openai_api_key, "sk-env");
        assert_eq!(config.green_api_url, "https://7103.api.greenapi.com");

        let config = DemoConfig::load(Some("2202".to_string()), None).unwrap();
        assert_eq!(config.instance_id, "2202");
        assert_eq!(config.instance_token, "env-token");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_url_is_rejected() {
        clear_env();
        env::set_var("OPENAI_BASE_URL", "localhost:8080");
        let err = DemoConfig::load(None, None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_BASE_URL"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bot_config_uses_fixed_settings() {
        clear_env();
        env::set_var("INSTANCE_ID", "1101");
        let bot_config = DemoConfig::load(None, None).unwrap().bot_config();

        assert_eq!(bot_config.green_api.id_instance, "1101");
        assert_eq!(
            bot_config.openai_base_url.as_deref(),
            Some(DEFAULT_OPENAI_BASE_URL)
        );
        let settings = bot_config.settings;
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_history_length, 15);
        assert_eq!(settings.temperature, 0.5);
        assert!(settings.handlers_first);
        assert!(settings.clear_webhook_queue_on_start);
        assert_eq!(settings.session_timeout, Duration::from_secs(1800));
        assert!(settings.system_message.starts_with("Always answer in a language"));
        clear_env();
    }
}
