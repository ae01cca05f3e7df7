//! Per-message moderation pipeline
//!
//! classify -> decide -> enforce, once per inbound message, with no state
//! carried between messages.

use automod_classifier::Classifier;
use automod_core::{InboundMessage, Verdict};
use automod_policy::{
    EnforcementAction, EnforcementReport, Enforcer, GroupConfigStore, ModerationPolicy,
    ModerationTarget,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of moderating one message
#[derive(Debug, Clone)]
pub struct ModerationOutcome {
    pub verdict: Verdict,
    pub action: EnforcementAction,
    pub report: EnforcementReport,
}

/// Runs the moderation pipeline for inbound messages
#[derive(Clone)]
pub struct Moderator {
    classifier: Arc<dyn Classifier>,
    store: Arc<GroupConfigStore>,
    policy: ModerationPolicy,
    enforcer: Enforcer,
}

impl Moderator {
    /// Create a moderator
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<GroupConfigStore>,
        enforcer: Enforcer,
    ) -> Self {
        Self {
            classifier,
            store,
            policy: ModerationPolicy::new(),
            enforcer,
        }
    }

    /// Moderate one message.
    ///
    /// Returns `None` for messages that are never classified (bot authors).
    pub async fn moderate(
        &self,
        target: &dyn ModerationTarget,
        message: &InboundMessage,
    ) -> Option<ModerationOutcome> {
        if message.author_is_bot {
            return None;
        }

        let verdict = self.classifier.classify(&message.content).await;
        info!(
            message_id = message.id,
            classifier = self.classifier.name(),
            safety = %verdict.safety,
            categories = ?verdict.categories,
            "Message classified"
        );

        let enabled = message.group_id.map_or(false, |group| self.store.get(group));
        let action = self.policy.decide(enabled, &verdict);
        let report = self.enforcer.apply(target, &action, message).await;
        if report.has_failures() {
            warn!(message_id = message.id, action = action.kind(), "Enforcement incomplete");
        }

        Some(ModerationOutcome {
            verdict,
            action,
            report,
        })
    }
}
