//! GREEN-API instance credentials and polling settings.

/// Default GREEN-API host.
pub const DEFAULT_API_URL: &str = "https://api.green-api.com";

/// Seconds the server holds a `receiveNotification` call open when the queue is empty.
pub const DEFAULT_RECEIVE_TIMEOUT_SECS: u64 = 5;

/// Connection settings for one GREEN-API instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenApiConfig {
    pub api_url: String,
    pub id_instance: String,
    pub api_token_instance: String,
    pub receive_timeout_secs: u64,
}

impl GreenApiConfig {
    pub fn new(id_instance: impl Into<String>, api_token_instance: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            id_instance: id_instance.into(),
            api_token_instance: api_token_instance.into(),
            receive_timeout_secs: DEFAULT_RECEIVE_TIMEOUT_SECS,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_receive_timeout(mut self, secs: u64) -> Self {
        self.receive_timeout_secs = secs;
        self
    }

    /// `{api_url}/waInstance{id}/{method}/{token}`.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/waInstance{}/{}/{}",
            self.api_url.trim_end_matches('/'),
            self.id_instance,
            method,
            self.api_token_instance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let config = GreenApiConfig::new("1101000001", "d75b3a66").with_api_url("https://host/");
        assert_eq!(
            config.method_url("sendMessage"),
            "https://host/waInstance1101000001/sendMessage/d75b3a66"
        );
        assert_eq!(config.receive_timeout_secs, DEFAULT_RECEIVE_TIMEOUT_SECS);
    }
}
