//! AGI chat pipe.
//!
//! A thin passthrough pipe: the AGI endpoint speaks the host's own line
//! format, so streamed responses are relayed verbatim and non-streaming
//! bodies are returned as raw JSON. The pipe's work is payload defaulting,
//! the `user` identity block, and the session header.

pub mod config;
mod types;

pub use config::{AGI_API_URL, AgiValves};

use async_trait::async_trait;

use self::types::{AgiPayload, AgiUser};
use crate::error::{ErrorValue, PipeError, classify_http_error};
use crate::traits::Pipe;
use crate::types::{ChatRequest, ModelEntry, PipeOutput};
use crate::utils::streaming::StreamFactory;

/// Header carrying the caller's session id
const SESSION_HEADER: &str = "x-session-id";

/// Session and user id used when the host attaches no identity
const DEFAULT_USER_ID: &str = "default";

/// Pipe for a self-hosted AGI chat endpoint.
pub struct AgiPipe {
    valves: AgiValves,
    http_client: reqwest::Client,
}

impl AgiPipe {
    /// Create a pipe with a fresh HTTP client.
    pub fn new(valves: AgiValves) -> Self {
        Self {
            valves,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a pipe reusing an existing HTTP client.
    pub fn with_client(valves: AgiValves, http_client: reqwest::Client) -> Self {
        Self {
            valves,
            http_client,
        }
    }

    /// Current valve settings.
    pub fn valves(&self) -> &AgiValves {
        &self.valves
    }

    /// Translate a host request into the upstream payload.
    ///
    /// Missing sampling parameters fall back to the valve defaults, and a
    /// missing or empty model falls back to the default model. The user
    /// block is always present, with placeholder identity when the host
    /// attaches none.
    fn build_payload(&self, request: &ChatRequest) -> Result<AgiPayload, PipeError> {
        let user = request.user.clone().unwrap_or_default();

        let environment = match user.environment {
            Some(value) => serde_json::to_string(&value)?,
            None => "{}".to_string(),
        };

        let model = if request.model.is_empty() {
            self.valves.default_model.clone()
        } else {
            request.model.clone()
        };

        Ok(AgiPayload {
            model,
            messages: request.messages.clone(),
            stream: request.stream,
            temperature: request
                .temperature
                .unwrap_or(self.valves.default_temperature),
            max_tokens: request.max_tokens.unwrap_or(self.valves.default_max_tokens),
            user: AgiUser {
                uuid: user.id.unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
                name: user.name.unwrap_or_else(|| "User".to_string()),
                context: user.context.unwrap_or_default(),
                environment,
            },
        })
    }

    /// Build HTTP headers
    fn build_headers(&self, session_id: &str) -> Result<reqwest::header::HeaderMap, PipeError> {
        let mut headers = reqwest::header::HeaderMap::new();

        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", self.valves.api_key))
                .map_err(|e| PipeError::ConfigurationError(format!("Invalid API key: {e}")))?,
        );

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        headers.insert(
            reqwest::header::HeaderName::from_static(SESSION_HEADER),
            reqwest::header::HeaderValue::from_str(session_id)
                .map_err(|e| PipeError::ConfigurationError(format!("Invalid session id: {e}")))?,
        );

        Ok(headers)
    }

    async fn execute(&self, request: ChatRequest) -> Result<PipeOutput, PipeError> {
        self.valves.validate()?;

        let payload = self.build_payload(&request)?;
        let headers = self.build_headers(&payload.user.uuid)?;

        tracing::debug!(
            model = %payload.model,
            stream = payload.stream,
            session = %payload.user.uuid,
            "forwarding chat request to AGI endpoint"
        );

        let builder = self
            .http_client
            .post(&self.valves.api_url)
            .headers(headers)
            .json(&payload);

        if payload.stream {
            // The endpoint already emits host-ready lines; relay them as-is.
            let lines = StreamFactory::create_line_stream(builder).await?;
            return Ok(PipeOutput::Stream(lines));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body_text));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(PipeOutput::Json(body))
    }
}

/// Fold a pipe failure into the envelope text the host renders.
fn error_value(error: &PipeError) -> ErrorValue {
    match error {
        PipeError::ApiError {
            code,
            details: Some(details),
            ..
        } => ErrorValue::new(format!(
            "Error connecting to AGI chat: HTTP {code} - {details}"
        )),
        PipeError::ApiError { code, message, .. } => ErrorValue::new(format!(
            "Error connecting to AGI chat: HTTP {code} - {message}"
        )),
        PipeError::HttpError(text) => {
            ErrorValue::new(format!("Error connecting to AGI chat: {text}"))
        }
        other => ErrorValue::new(format!("Error connecting to AGI chat: {other}")),
    }
}

#[async_trait]
impl Pipe for AgiPipe {
    fn name(&self) -> &str {
        "AGI Chat Pipe"
    }

    fn models(&self) -> Vec<ModelEntry> {
        vec![ModelEntry::new(
            self.valves.default_model.as_str(),
            self.name(),
        )]
    }

    async fn pipe(&self, request: ChatRequest) -> PipeOutput {
        match self.execute(request).await {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(error = %error, "AGI pipe call failed");
                PipeOutput::Error(error_value(&error))
            }
        }
    }
}
