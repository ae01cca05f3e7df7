//! Core types for automod

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a group (a chat server/guild)
pub type GroupId = u64;

/// Safety level reported by the classification model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Safety {
    Safe,
    Unsafe,
    Controversial,
    /// The call failed or the response carried no recognizable safety marker
    Unknown,
}

impl Safety {
    /// Parse a safety label, ignoring case.
    ///
    /// Only the closed set `Safe`, `Unsafe`, `Controversial` is accepted;
    /// anything else maps to [`Safety::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "safe" => Self::Safe,
            "unsafe" => Self::Unsafe,
            "controversial" => Self::Controversial,
            _ => Self::Unknown,
        }
    }

    /// Normalized label, suitable for logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Unsafe => "Unsafe",
            Self::Controversial => "Controversial",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Safety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured safety classification result for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Safety level
    pub safety: Safety,

    /// Free-text category label (e.g. "Violent", "Spam")
    pub categories: Option<String>,
}

impl Verdict {
    /// Create a verdict
    pub fn new(safety: Safety, categories: Option<String>) -> Self {
        Self { safety, categories }
    }

    /// The verdict every failed or unparseable classification collapses to
    pub fn unknown() -> Self {
        Self {
            safety: Safety::Unknown,
            categories: None,
        }
    }

    /// Whether the verdict carries a usable safety level
    pub fn is_known(&self) -> bool {
        self.safety != Safety::Unknown
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A chat message in a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Platform-neutral view of an inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Message ID on the platform
    pub id: u64,

    /// Channel the message was posted in
    pub channel_id: u64,

    /// Group the channel belongs to, `None` for direct messages
    pub group_id: Option<GroupId>,

    /// Author user ID
    pub author_id: u64,

    /// Author display name (for logs)
    pub author_name: String,

    /// Whether the author is a bot account
    pub author_is_bot: bool,

    /// Message text
    pub content: String,
}

impl InboundMessage {
    /// Mention markup addressing the author
    pub fn author_mention(&self) -> String {
        format!("<@{}>", self.author_id)
    }
}
