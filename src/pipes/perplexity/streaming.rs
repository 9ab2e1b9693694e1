//! Stream normalization for Perplexity SSE responses.
//!
//! The upstream stream interleaves content deltas, a finish marker, and
//! citation lists that may arrive before or after the content finishes.
//! [`normalize_stream`] flattens all of that into plain text fragments:
//! content passes through as it arrives, and exactly one citation trailer
//! is appended once both the finish marker and a non-empty citation list
//! have been seen.

use async_stream::stream;
use futures_util::StreamExt;

use super::citations::format_citation_trailer;
use super::types::PerplexityStreamEvent;
use crate::types::FragmentStream;

/// SSE data-line marker stripped before JSON parsing.
const DATA_PREFIX: &str = "data: ";

/// Finish reason signalling the end of content delivery.
const FINISH_REASON_STOP: &str = "stop";

/// What a single upstream line contributes to the output stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineOutcome {
    /// Nothing to emit for this line.
    Skip,
    /// A content fragment to pass through.
    Fragment(String),
    /// Content and citations are both complete: emit the optional
    /// same-line fragment, then the trailer, then stop reading.
    Finish {
        fragment: Option<String>,
        trailer: String,
    },
}

/// Accumulated state across stream lines.
#[derive(Debug, Default)]
pub(crate) struct StreamState {
    /// Latest citation list; later lists overwrite earlier ones.
    citations: Vec<String>,
    /// Set once a `finish_reason: "stop"` has been observed.
    content_finished: bool,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fold one upstream line into the state and report what to emit.
    pub(crate) fn process_line(&mut self, line: &str) -> LineOutcome {
        if line.is_empty() {
            return LineOutcome::Skip;
        }

        let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);

        // Covers keep-alives and the `[DONE]` sentinel alongside genuinely
        // malformed lines.
        let event: PerplexityStreamEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("skipping unparseable stream line: {e}");
                return LineOutcome::Skip;
            }
        };

        let mut fragment = None;
        if let Some(choice) = event.choices.as_ref().and_then(|choices| choices.first()) {
            if let Some(content) = choice.delta.as_ref().and_then(|delta| delta.content.as_ref()) {
                if !content.is_empty() {
                    fragment = Some(content.clone());
                }
            }

            if choice.finish_reason.as_deref() == Some(FINISH_REASON_STOP) {
                self.content_finished = true;
            }
        }

        if let Some(citations) = event.citations {
            self.citations = citations;
        }

        if self.content_finished && !self.citations.is_empty() {
            return LineOutcome::Finish {
                fragment,
                trailer: format_citation_trailer(&self.citations),
            };
        }

        match fragment {
            Some(content) => LineOutcome::Fragment(content),
            None => LineOutcome::Skip,
        }
    }
}

/// Normalize a line stream into a fragment stream.
///
/// Transport errors are passed through and terminate the stream. Once the
/// trailer is emitted, remaining upstream lines are not read.
pub(crate) fn normalize_stream(mut lines: FragmentStream) -> FragmentStream {
    Box::pin(stream! {
        let mut state = StreamState::new();

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };

            match state.process_line(&line) {
                LineOutcome::Skip => {}
                LineOutcome::Fragment(content) => yield Ok(content),
                LineOutcome::Finish { fragment, trailer } => {
                    if let Some(content) = fragment {
                        yield Ok(content);
                    }
                    yield Ok(trailer);
                    break;
                }
            }
        }
    })
}
