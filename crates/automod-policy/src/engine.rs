//! Moderation policy evaluation

use automod_core::{Safety, Verdict};

use crate::action::{EnforcementAction, UNSPECIFIED_REASON};

/// Maps a verdict to an enforcement action for one group.
///
/// Deterministic and free of side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModerationPolicy;

impl ModerationPolicy {
    /// Create a new policy
    pub fn new() -> Self {
        Self
    }

    /// Decide what to do with a message given its group's setting and verdict
    pub fn decide(&self, group_enabled: bool, verdict: &Verdict) -> EnforcementAction {
        if !group_enabled {
            return EnforcementAction::None;
        }

        match verdict.safety {
            Safety::Safe | Safety::Unknown => EnforcementAction::None,
            Safety::Controversial => EnforcementAction::Annotate {
                note: verdict
                    .categories
                    .clone()
                    .unwrap_or_else(|| Safety::Controversial.as_str().to_string()),
            },
            Safety::Unsafe => EnforcementAction::RemoveAndNotify {
                reason: verdict
                    .categories
                    .clone()
                    .unwrap_or_else(|| UNSPECIFIED_REASON.to_string()),
            },
        }
    }
}
