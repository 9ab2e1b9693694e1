//! Wire types for the Perplexity chat completions API.

use serde::{Deserialize, Serialize};

use crate::types::{Message, Usage};

/// Request body sent to `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PerplexityPayload {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_citations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_images: Option<bool>,
}

/// One parsed SSE event from the streaming endpoint.
///
/// Every field is optional: events carrying only citations, only deltas,
/// or neither all occur in practice.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PerplexityStreamEvent {
    pub choices: Option<Vec<StreamChoice>>,
    pub citations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamChoice {
    pub delta: Option<StreamDelta>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamDelta {
    pub content: Option<String>,
}

/// Non-streaming completion response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PerplexityResponse {
    pub id: String,
    pub model: String,
    pub created: i64,
    pub usage: Usage,
    pub object: String,
    pub choices: Vec<PerplexityChoice>,
    pub citations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PerplexityChoice {
    pub index: u32,
    pub finish_reason: Option<String>,
    pub message: Message,
}
