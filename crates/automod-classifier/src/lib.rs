//! automod Classifiers
//!
//! Safety classification for chat messages backed by a remote guard model.
//!
//! The [`ClassificationClient`] issues a streamed chat-completion request,
//! decodes the streamed body with [`automod_core::StreamDecoder`], and
//! extracts a verdict through a [`VerdictParser`]. Every failure collapses to
//! an unknown verdict, so callers never see an error.

pub mod classifier;
pub mod client;
pub mod config;
pub mod error;
pub mod parser;

pub use classifier::Classifier;
pub use client::ClassificationClient;
pub use config::{ClassifierConfig, DEFAULT_TIMEOUT};
pub use error::ClassifyError;
pub use parser::{RegexVerdictParser, VerdictParser};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::client::ClassificationClient;
    pub use crate::config::ClassifierConfig;
    pub use crate::parser::{RegexVerdictParser, VerdictParser};
}
