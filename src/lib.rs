//! # WebUI Pipes - LLM Adapter Pipes for Chat Hosts
//!
//! WebUI Pipes bridges a chat-application host to upstream LLM APIs. Each
//! pipe translates host chat requests into one upstream's request format,
//! forwards them, and reshapes the response (streamed or not) back into
//! what the host renders.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Uniform Pipe Trait**: Every upstream is a [`Pipe`] with a model catalog, a
//!   fallible-by-value `pipe` call, and optional status reporting.
//! - **Stream Normalization**: The Perplexity pipe folds interleaved content deltas
//!   and citation metadata into one clean, terminated fragment sequence.
//! - **Errors As Data**: A pipe call never faults; failures come back as an
//!   `{error}` value the host renders like any other output.
//! - **HTTP Customization**: Every pipe accepts a shared `reqwest` client.
//! - **Feature-Gated Pipes**: Compile only the upstreams you deploy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use webui_pipes::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipe = PerplexityPipe::new(PerplexityValves::new("your-api-key"));
//!
//!     let request = ChatRequest::new("sonar")
//!         .with_message(Message::user("What is Rust?"))
//!         .with_stream(true);
//!
//!     match pipe.pipe(request).await {
//!         PipeOutput::Stream(mut fragments) => {
//!             while let Some(fragment) = fragments.next().await {
//!                 match fragment {
//!                     Ok(text) => print!("{text}"),
//!                     Err(e) => eprintln!("stream failed: {e}"),
//!                 }
//!             }
//!         }
//!         PipeOutput::Error(error) => eprintln!("{error}"),
//!         other => println!("{other:?}"),
//!     }
//! }
//! ```

pub mod error;
pub mod pipes;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{ErrorValue, PipeError};
pub use traits::{Pipe, StatusEmitter, StatusEvent};
pub use types::{
    ChatRequest, FormattedChoice, FormattedResponse, FragmentStream, Message, ModelEntry,
    PipeOutput, Usage, UserContext,
};

#[cfg(feature = "agi")]
pub use pipes::agi::{AgiPipe, AgiValves};
#[cfg(feature = "perplexity")]
pub use pipes::perplexity::{PerplexityPipe, PerplexityValves};

/// Common imports for host integrations.
pub mod prelude {
    pub use crate::error::{ErrorValue, PipeError};
    pub use crate::traits::{Pipe, StatusEmitter, StatusEvent};
    pub use crate::types::{
        ChatRequest, FormattedChoice, FormattedResponse, FragmentStream, Message, ModelEntry,
        PipeOutput, Usage, UserContext,
    };

    #[cfg(feature = "agi")]
    pub use crate::pipes::agi::{AgiPipe, AgiValves};
    #[cfg(feature = "perplexity")]
    pub use crate::pipes::perplexity::{PerplexityPipe, PerplexityValves};
}
