//! Perplexity pipe configuration.

use serde::{Deserialize, Serialize};

use crate::error::PipeError;

/// Default base URL for the Perplexity API
pub const PERPLEXITY_API_BASE_URL: &str = "https://api.perplexity.ai";

/// Default prefix prepended to model names in the catalog
pub const DEFAULT_NAME_PREFIX: &str = "Perplexity/";

/// Host-adjustable settings for the Perplexity pipe.
///
/// All fields have working defaults except the API key, which is read from
/// `PERPLEXITY_API_KEY` when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerplexityValves {
    /// Prefix prepended to model names shown in the catalog
    pub name_prefix: String,
    /// Base URL of the Perplexity API
    pub api_base_url: String,
    /// API key used as a bearer token
    pub api_key: String,
}

impl Default for PerplexityValves {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            api_base_url: PERPLEXITY_API_BASE_URL.to_string(),
            api_key: std::env::var("PERPLEXITY_API_KEY").unwrap_or_default(),
        }
    }
}

impl PerplexityValves {
    /// Create valves with an explicit API key and default everything else.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_base_url = base_url.to_string();
        self
    }

    /// Override the catalog name prefix.
    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = prefix.to_string();
        self
    }

    /// Validate the configuration before any upstream call.
    pub fn validate(&self) -> Result<(), PipeError> {
        if self.api_key.is_empty() {
            return Err(PipeError::ConfigurationError(
                "API key cannot be empty".to_string(),
            ));
        }

        if self.api_base_url.is_empty() {
            return Err(PipeError::ConfigurationError(
                "Base URL cannot be empty".to_string(),
            ));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(PipeError::ConfigurationError(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
