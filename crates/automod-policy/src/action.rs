//! Enforcement action definitions

use serde::{Deserialize, Serialize};

/// Reason text used when an unsafe verdict carries no categories
pub const UNSPECIFIED_REASON: &str = "unspecified";

/// Moderation effect to apply to one message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum EnforcementAction {
    /// Leave the message alone
    #[default]
    None,

    /// Flag the message without removing it
    Annotate {
        /// What the flag is about
        note: String,
    },

    /// Delete the message and tell its author why
    RemoveAndNotify {
        /// Reason cited in the notice
        reason: String,
    },
}

impl EnforcementAction {
    /// Whether this action does anything at all
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short name for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Annotate { .. } => "annotate",
            Self::RemoveAndNotify { .. } => "remove_and_notify",
        }
    }
}
