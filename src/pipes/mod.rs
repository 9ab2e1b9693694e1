//! Pipe implementations, one module per upstream API.

#[cfg(feature = "agi")]
pub mod agi;
#[cfg(feature = "perplexity")]
pub mod perplexity;
