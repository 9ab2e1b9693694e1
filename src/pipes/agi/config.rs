//! AGI pipe configuration.

use serde::{Deserialize, Serialize};

use crate::error::PipeError;

/// Default AGI chat endpoint URL
pub const AGI_API_URL: &str = "http://localhost:8080/api/agi/chat";

/// Default model requested when the host names none
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion token limit
pub const DEFAULT_MAX_TOKENS: u32 = 16384;

/// Host-adjustable settings for the AGI pipe.
///
/// The API key is read from `AGI_API_KEY` when unset and may stay empty:
/// local AGI deployments commonly run without authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgiValves {
    /// Full URL of the AGI chat endpoint
    pub api_url: String,
    /// API key used as a bearer token, may be empty
    pub api_key: String,
    /// Model requested when the host request names none
    pub default_model: String,
    /// Temperature used when the host request carries none
    pub default_temperature: f64,
    /// Token limit used when the host request carries none
    pub default_max_tokens: u32,
}

impl Default for AgiValves {
    fn default() -> Self {
        Self {
            api_url: AGI_API_URL.to_string(),
            api_key: std::env::var("AGI_API_KEY").unwrap_or_default(),
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AgiValves {
    /// Create valves pointing at an explicit endpoint.
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: String::new(),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    /// Override the fallback model.
    pub fn with_default_model(mut self, model: &str) -> Self {
        self.default_model = model.to_string();
        self
    }

    /// Validate the configuration before any upstream call.
    pub fn validate(&self) -> Result<(), PipeError> {
        if self.api_url.is_empty() {
            return Err(PipeError::ConfigurationError(
                "API URL cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(PipeError::ConfigurationError(
                "API URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
