//! Core types shared by every pipe.
//!
//! Host-facing payloads are explicit structs with named optional fields so
//! the translators' and formatters' field contracts are checked at compile
//! time. Provider-specific fields the host never touches (extra `usage`
//! counters, for example) survive through flattened maps instead of being
//! dropped.

use std::collections::HashMap;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorValue, PipeError};

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role (`system`, `user`, `assistant`, ...)
    pub role: String,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a message with an arbitrary role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Identity and context the host attaches to a request.
///
/// Used only to populate headers and the AGI `user` payload field; pipes
/// never interpret the contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserContext {
    /// Stable caller id, doubles as the session id
    pub id: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Free-form context blob
    pub context: Option<String>,
    /// Arbitrary environment document
    pub environment: Option<serde_json::Value>,
}

/// Inbound chat request from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model id as the host displays it (may carry a pipe name prefix)
    pub model: String,
    /// Conversation so far, oldest first; may start with a system message
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Whether the caller wants incremental delivery
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Ask the upstream to report citation URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_citations: Option<bool>,
    /// Ask the upstream to report image results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserContext>,
}

impl ChatRequest {
    /// Create a request for the given model with no messages
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            stream: false,
            temperature: None,
            max_tokens: None,
            return_citations: None,
            return_images: None,
            user: None,
        }
    }

    /// Append one message
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the message list
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Request or decline incremental delivery
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the citation passthrough flag
    pub fn with_return_citations(mut self, flag: bool) -> Self {
        self.return_citations = Some(flag);
        self
    }

    /// Set the image passthrough flag
    pub fn with_return_images(mut self, flag: bool) -> Self {
        self.return_images = Some(flag);
        self
    }

    /// Attach caller identity/context
    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = Some(user);
        self
    }
}

/// Token accounting reported by the upstream API.
///
/// Counters beyond the standard three are provider-specific; the flattened
/// extras map carries them through a reshape unaltered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
    /// Provider-specific counters, passed through verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One choice of a formatted non-streaming response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedChoice {
    pub index: u32,
    pub finish_reason: Option<String>,
    /// Complete assistant message
    pub message: Message,
    /// Empty delta placeholder, kept for schema symmetry with streamed chunks
    pub delta: Message,
}

/// Non-streaming response reshaped for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResponse {
    pub id: String,
    pub model: String,
    pub created: i64,
    pub usage: Usage,
    pub object: String,
    pub choices: Vec<FormattedChoice>,
}

/// One selectable model advertised by a pipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Model id the host sends back in [`ChatRequest::model`]
    pub id: String,
    /// Display name shown to the end user
    pub name: String,
}

impl ModelEntry {
    /// Create a model entry
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The lazy fragment sequence a streaming pipe call returns.
///
/// Single-pass and forward-only: dropping it before exhaustion releases the
/// underlying connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, PipeError>> + Send>>;

/// Everything a pipe call can hand back to the host.
///
/// A pipe call never faults; the failure shape is [`PipeOutput::Error`] so
/// the host can render it like any other output.
pub enum PipeOutput {
    /// Incremental text fragments (streaming)
    Stream(FragmentStream),
    /// Reshaped completion (non-streaming)
    Completion(FormattedResponse),
    /// Upstream JSON passed through unmodified (non-streaming)
    Json(serde_json::Value),
    /// Failure surfaced as data
    Error(ErrorValue),
}

impl PipeOutput {
    /// Consume the output as a fragment stream, if it is one
    pub fn into_stream(self) -> Option<FragmentStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Consume the output as a formatted completion, if it is one
    pub fn into_completion(self) -> Option<FormattedResponse> {
        match self {
            Self::Completion(response) => Some(response),
            _ => None,
        }
    }

    /// Consume the output as raw JSON, if it is one
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the error value, if the call failed
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Self::Error(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Debug for PipeOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("PipeOutput::Stream(..)"),
            Self::Completion(response) => {
                f.debug_tuple("PipeOutput::Completion").field(response).finish()
            }
            Self::Json(value) => f.debug_tuple("PipeOutput::Json").field(value).finish(),
            Self::Error(value) => f.debug_tuple("PipeOutput::Error").field(value).finish(),
        }
    }
}
