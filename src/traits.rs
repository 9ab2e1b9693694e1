//! Pipe capability traits.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::{ChatRequest, ModelEntry, PipeOutput};

/// Progress notification emitted around a pipe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusEvent {
    /// The call has been accepted and is running
    InProgress,
    /// The call produced a non-error output
    Complete,
    /// The call produced an error value
    Error { error: String },
}

/// Sink for status events.
///
/// Hosts wrap whatever event channel they marshal progress through in this
/// trait; pipes only ever call [`emit`](StatusEmitter::emit).
#[async_trait]
pub trait StatusEmitter: Send + Sync {
    /// Deliver one status event to the host
    async fn emit(&self, event: StatusEvent);
}

/// The adapter unit mapping a host chat request to an upstream API call and
/// back.
///
/// Implementations translate the request into their upstream's dialect,
/// forward it, and reshape the response. A call never faults: every failure
/// comes back as [`PipeOutput::Error`] so the host can render it to the end
/// user.
#[async_trait]
pub trait Pipe: Send + Sync {
    /// Human-readable pipe name
    fn name(&self) -> &str;

    /// Models this pipe advertises to the host
    fn models(&self) -> Vec<ModelEntry>;

    /// Execute one chat request
    async fn pipe(&self, request: ChatRequest) -> PipeOutput;

    /// Execute one chat request, reporting progress through `emitter`.
    ///
    /// Emits `in_progress` before the call, then `complete` or `error`
    /// depending on the output. Without an emitter this is a plain
    /// [`pipe`](Pipe::pipe) call.
    async fn pipe_with_status(
        &self,
        request: ChatRequest,
        emitter: Option<&dyn StatusEmitter>,
    ) -> PipeOutput {
        if let Some(emitter) = emitter {
            emitter.emit(StatusEvent::InProgress).await;
        }

        let output = self.pipe(request).await;

        if let Some(emitter) = emitter {
            match &output {
                PipeOutput::Error(value) => {
                    emitter
                        .emit(StatusEvent::Error {
                            error: value.error.clone(),
                        })
                        .await;
                }
                _ => emitter.emit(StatusEvent::Complete).await,
            }
        }

        output
    }

    /// Called once when the host loads the pipe
    async fn on_startup(&self) {
        tracing::info!(pipe = %self.name(), "pipe starting");
    }

    /// Called once when the host unloads the pipe
    async fn on_shutdown(&self) {
        tracing::info!(pipe = %self.name(), "pipe shutting down");
    }
}
