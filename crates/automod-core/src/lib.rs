//! automod Core
//!
//! Core types and utilities shared across automod components.
//!
//! This crate provides:
//! - The moderation data model (verdicts, safety levels, inbound messages)
//! - Error types and result handling
//! - The stream decoder for streamed chat-completion bodies

pub mod decoder;
pub mod error;
pub mod types;

pub use decoder::{CompletionChunk, Frame, StreamDecoder};
pub use error::{Error, Result};
pub use types::{ChatMessage, GroupId, InboundMessage, Safety, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::decoder::StreamDecoder;
    pub use crate::error::{Error, Result};
    pub use crate::types::{GroupId, InboundMessage, Safety, Verdict};
}
