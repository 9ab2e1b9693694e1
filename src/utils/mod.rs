//! Utility modules shared across pipes.

pub mod messages;
pub mod streaming;
