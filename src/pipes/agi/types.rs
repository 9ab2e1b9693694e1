//! Wire types for the AGI chat endpoint.

use serde::Serialize;

use crate::types::Message;

/// Request body sent to the AGI chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AgiPayload {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub user: AgiUser,
}

/// Caller identity forwarded to the endpoint.
///
/// `environment` is a JSON document carried as a string, the shape the
/// endpoint expects.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AgiUser {
    pub uuid: String,
    pub name: String,
    pub context: String,
    pub environment: String,
}
