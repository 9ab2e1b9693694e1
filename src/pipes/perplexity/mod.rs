//! Perplexity manifold pipe.
//!
//! Translates host chat requests into Perplexity `/chat/completions` calls
//! and reshapes responses for the host. Streaming calls run through the
//! citation-aware normalizer in [`streaming`]; non-streaming calls are
//! reshaped in one pass, with citations appended to the first choice.

mod citations;
pub mod config;
mod streaming;
mod types;

pub use config::{DEFAULT_NAME_PREFIX, PERPLEXITY_API_BASE_URL, PerplexityValves};

use async_trait::async_trait;

use self::citations::format_citation_trailer;
use self::streaming::normalize_stream;
use self::types::{PerplexityPayload, PerplexityResponse};
use crate::error::{ErrorValue, PipeError, classify_http_error};
use crate::traits::Pipe;
use crate::types::{
    ChatRequest, FormattedChoice, FormattedResponse, Message, ModelEntry, PipeOutput,
};
use crate::utils::messages::{DEFAULT_SYSTEM_PROMPT, pop_system_message};
use crate::utils::streaming::StreamFactory;

/// Sampling temperature sent on every request
const TEMPERATURE: f64 = 0.2;

/// Nucleus sampling parameter sent on every request
const TOP_P: f64 = 0.9;

/// Pipe for the Perplexity Sonar model family.
pub struct PerplexityPipe {
    valves: PerplexityValves,
    http_client: reqwest::Client,
}

impl PerplexityPipe {
    /// Create a pipe with a fresh HTTP client.
    pub fn new(valves: PerplexityValves) -> Self {
        Self {
            valves,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a pipe reusing an existing HTTP client.
    pub fn with_client(valves: PerplexityValves, http_client: reqwest::Client) -> Self {
        Self {
            valves,
            http_client,
        }
    }

    /// Current valve settings.
    pub fn valves(&self) -> &PerplexityValves {
        &self.valves
    }

    /// Strip the first matching catalog prefix from a model id.
    ///
    /// At most one prefix is removed, checked in declaration order, so a raw
    /// Perplexity model name that happens to contain a dot survives intact.
    fn strip_model_prefix<'a>(&self, model: &'a str) -> &'a str {
        let prefixes = [
            self.valves.name_prefix.as_str(),
            "perplexity.",
            "perplexity_via_api.",
        ];

        prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| model.strip_prefix(prefix))
            .unwrap_or(model)
    }

    /// Translate a host request into the upstream payload.
    fn build_payload(&self, request: &ChatRequest) -> PerplexityPayload {
        let (system_message, rest) = pop_system_message(&request.messages);
        let system_prompt = system_message
            .map(|message| message.content.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let mut messages = Vec::with_capacity(rest.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend_from_slice(rest);

        PerplexityPayload {
            model: self.strip_model_prefix(&request.model).to_string(),
            messages,
            stream: request.stream,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            // Flags pass through only when present and true.
            return_citations: request.return_citations.filter(|&flag| flag),
            return_images: request.return_images.filter(|&flag| flag),
        }
    }

    /// Build HTTP headers
    fn build_headers(&self) -> Result<reqwest::header::HeaderMap, PipeError> {
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
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    async fn execute(&self, request: ChatRequest) -> Result<PipeOutput, PipeError> {
        self.valves.validate()?;

        let payload = self.build_payload(&request);
        let headers = self.build_headers()?;
        let url = format!("{}/chat/completions", self.valves.api_base_url);

        tracing::debug!(
            model = %payload.model,
            stream = payload.stream,
            "forwarding chat request to Perplexity"
        );

        let builder = self.http_client.post(&url).headers(headers).json(&payload);

        if payload.stream {
            let lines = StreamFactory::create_line_stream(builder).await?;
            return Ok(PipeOutput::Stream(normalize_stream(lines)));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body_text));
        }

        let completion: PerplexityResponse = response.json().await?;
        Ok(PipeOutput::Completion(self.format_response(completion)))
    }

    /// Reshape a non-streaming completion for the host.
    ///
    /// Every choice gains an empty `delta` placeholder; non-empty citations
    /// are appended to the first choice's message content as the same
    /// trailer the streaming path emits.
    fn format_response(&self, response: PerplexityResponse) -> FormattedResponse {
        let PerplexityResponse {
            id,
            model,
            created,
            usage,
            object,
            choices,
            citations,
        } = response;

        let mut choices: Vec<FormattedChoice> = choices
            .into_iter()
            .map(|choice| FormattedChoice {
                index: choice.index,
                finish_reason: choice.finish_reason,
                message: choice.message,
                delta: Message::assistant(""),
            })
            .collect();

        if let Some(citations) = citations.filter(|list| !list.is_empty()) {
            if let Some(first) = choices.first_mut() {
                first
                    .message
                    .content
                    .push_str(&format_citation_trailer(&citations));
            }
        }

        FormattedResponse {
            id,
            model,
            created,
            usage,
            object,
            choices,
        }
    }
}

/// Fold a pipe failure into the envelope text the host renders.
fn error_value(error: &PipeError) -> ErrorValue {
    match error {
        PipeError::ApiError { message, .. } => ErrorValue::new(format!("API Error: {message}")),
        PipeError::HttpError(text) => ErrorValue::new(format!("HTTP Error: {text}")),
        other => ErrorValue::new(format!("Error: {other}")),
    }
}

#[async_trait]
impl Pipe for PerplexityPipe {
    fn name(&self) -> &str {
        "Perplexity Manifold Pipe"
    }

    fn models(&self) -> Vec<ModelEntry> {
        let prefix = &self.valves.name_prefix;
        vec![
            ModelEntry::new("sonar", format!("{prefix}Sonar")),
            ModelEntry::new("sonar-pro", format!("{prefix}Sonar Pro")),
            ModelEntry::new("sonar-reasoning", format!("{prefix}Sonar Reasoning")),
        ]
    }

    async fn pipe(&self, request: ChatRequest) -> PipeOutput {
        match self.execute(request).await {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(error = %error, "Perplexity pipe call failed");
                PipeOutput::Error(error_value(&error))
            }
        }
    }
}
