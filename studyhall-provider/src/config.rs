use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Connection settings for the model provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.base_url.is_empty() {
            return Err(ProviderError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Configuration(format!("invalid base_url: {e}")))?;
        if self.model.is_empty() {
            return Err(ProviderError::Configuration(
                "model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
