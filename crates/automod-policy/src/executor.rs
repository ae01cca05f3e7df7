//! Enforcement of moderation actions
//!
//! Executes the action chosen by the policy against the chat platform:
//! - Annotate: log the flag, optionally react to the message
//! - RemoveAndNotify: delete the message, then tell the author why
//!
//! Every platform call is isolated. A failed deletion does not prevent the
//! notice and vice versa; nothing is retried and nothing is raised.

use async_trait::async_trait;
use automod_core::{InboundMessage, Result};
use tracing::{debug, info, warn};

use crate::action::EnforcementAction;

/// Chat-platform capabilities the enforcer calls into
#[async_trait]
pub trait ModerationTarget: Send + Sync {
    /// Delete the given message
    async fn delete_message(&self, message: &InboundMessage) -> Result<()>;

    /// Post `text` in the message's channel
    async fn send_notice(&self, message: &InboundMessage, text: &str) -> Result<()>;

    /// Add a reaction to the message
    async fn react(&self, message: &InboundMessage, emoji: &str) -> Result<()>;
}

/// What happened to one enforcement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOutcome {
    /// The action did not call for this step
    #[default]
    Skipped,
    /// The platform call succeeded
    Done,
    /// The platform call failed; the error was logged
    Failed,
}

impl StepOutcome {
    fn from_result(result: &Result<()>) -> Self {
        if result.is_ok() {
            Self::Done
        } else {
            Self::Failed
        }
    }
}

/// Per-step record of an applied action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnforcementReport {
    pub deleted: StepOutcome,
    pub notified: StepOutcome,
    pub reacted: StepOutcome,
}

impl EnforcementReport {
    /// Whether any step failed
    pub fn has_failures(&self) -> bool {
        [self.deleted, self.notified, self.reacted].contains(&StepOutcome::Failed)
    }
}

/// Applies enforcement actions to messages
#[derive(Debug, Clone, Default)]
pub struct Enforcer {
    /// Reaction added to annotated messages; `None` keeps annotation log-only
    annotate_reaction: Option<String>,
}

impl Enforcer {
    /// Create an enforcer whose annotations only log
    pub fn new() -> Self {
        Self::default()
    }

    /// React with `emoji` to annotated messages
    pub fn with_annotate_reaction(mut self, emoji: impl Into<String>) -> Self {
        self.annotate_reaction = Some(emoji.into());
        self
    }

    /// Notice posted after removing a message
    pub fn removal_notice(message: &InboundMessage, reason: &str) -> String {
        format!(
            "{} your message was removed. Reason: `{}`.",
            message.author_mention(),
            reason
        )
    }

    /// Apply `action` to `message`. Never fails.
    pub async fn apply(
        &self,
        target: &dyn ModerationTarget,
        action: &EnforcementAction,
        message: &InboundMessage,
    ) -> EnforcementReport {
        let mut report = EnforcementReport::default();

        match action {
            EnforcementAction::None => {}

            EnforcementAction::Annotate { note } => {
                info!(
                    message_id = message.id,
                    author = %message.author_name,
                    note = %note,
                    "Controversial message flagged"
                );

                if let Some(emoji) = &self.annotate_reaction {
                    let result = target.react(message, emoji).await;
                    if let Err(e) = &result {
                        debug!(message_id = message.id, error = %e, "Failed to react to message");
                        record_failure("react");
                    }
                    report.reacted = StepOutcome::from_result(&result);
                }
            }

            EnforcementAction::RemoveAndNotify { reason } => {
                info!(
                    message_id = message.id,
                    author = %message.author_name,
                    reason = %reason,
                    "Removing unsafe message"
                );

                let deleted = target.delete_message(message).await;
                if let Err(e) = &deleted {
                    warn!(message_id = message.id, error = %e, "Failed to delete message");
                    record_failure("delete");
                }
                report.deleted = StepOutcome::from_result(&deleted);

                let notice = Self::removal_notice(message, reason);
                let notified = target.send_notice(message, &notice).await;
                if let Err(e) = &notified {
                    warn!(
                        channel_id = message.channel_id,
                        error = %e,
                        "Failed to send removal notice"
                    );
                    record_failure("notify");
                }
                report.notified = StepOutcome::from_result(&notified);
            }
        }

        metrics::counter!("automod_enforcements_total", "action" => action.kind()).increment(1);
        report
    }
}

fn record_failure(step: &'static str) {
    metrics::counter!("automod_enforcement_failures_total", "step" => step).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use automod_core::Error;
    use parking_lot::Mutex;

    /// Records every platform call; optionally fails some of them
    #[derive(Default)]
    struct RecordingTarget {
        fail_delete: bool,
        fail_notice: bool,
        fail_react: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModerationTarget for RecordingTarget {
        async fn delete_message(&self, message: &InboundMessage) -> Result<()> {
            self.calls.lock().push(format!("delete:{}", message.id));
            if self.fail_delete {
                return Err(Error::platform("missing permissions"));
            }
            Ok(())
        }

        async fn send_notice(&self, _message: &InboundMessage, text: &str) -> Result<()> {
            self.calls.lock().push(format!("notice:{}", text));
            if self.fail_notice {
                return Err(Error::platform("channel gone"));
            }
            Ok(())
        }

        async fn react(&self, _message: &InboundMessage, emoji: &str) -> Result<()> {
            self.calls.lock().push(format!("react:{}", emoji));
            if self.fail_react {
                return Err(Error::platform("reactions disabled"));
            }
            Ok(())
        }
    }

    fn message() -> InboundMessage {
        InboundMessage {
            id: 10,
            channel_id: 20,
            group_id: Some(30),
            author_id: 40,
            author_name: "author".to_string(),
            author_is_bot: false,
            content: "bad words".to_string(),
        }
    }

    fn remove(reason: &str) -> EnforcementAction {
        EnforcementAction::RemoveAndNotify {
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn test_none_is_noop() {
        let target = RecordingTarget::default();
        let report = Enforcer::new()
            .apply(&target, &EnforcementAction::None, &message())
            .await;

        assert_eq!(report, EnforcementReport::default());
        assert!(target.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_notify() {
        let target = RecordingTarget::default();
        let report = Enforcer::new().apply(&target, &remove("insult"), &message()).await;

        assert_eq!(report.deleted, StepOutcome::Done);
        assert_eq!(report.notified, StepOutcome::Done);
        assert_eq!(
            *target.calls.lock(),
            vec![
                "delete:10".to_string(),
                "notice:<@40> your message was removed. Reason: `insult`.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_still_notifies() {
        let target = RecordingTarget {
            fail_delete: true,
            ..Default::default()
        };
        let report = Enforcer::new().apply(&target, &remove("spam"), &message()).await;

        assert_eq!(report.deleted, StepOutcome::Failed);
        assert_eq!(report.notified, StepOutcome::Done);
        assert!(report.has_failures());
        assert_eq!(target.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_notice_after_delete() {
        let target = RecordingTarget {
            fail_notice: true,
            ..Default::default()
        };
        let report = Enforcer::new().apply(&target, &remove("spam"), &message()).await;

        assert_eq!(report.deleted, StepOutcome::Done);
        assert_eq!(report.notified, StepOutcome::Failed);
    }

    #[tokio::test]
    async fn test_both_steps_fail_without_retry() {
        let target = RecordingTarget {
            fail_delete: true,
            fail_notice: true,
            ..Default::default()
        };
        let report = Enforcer::new().apply(&target, &remove("spam"), &message()).await;

        assert_eq!(report.deleted, StepOutcome::Failed);
        assert_eq!(report.notified, StepOutcome::Failed);
        assert_eq!(target.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_annotate_is_log_only_by_default() {
        let target = RecordingTarget::default();
        let action = EnforcementAction::Annotate {
            note: "Politics".to_string(),
        };
        let report = Enforcer::new().apply(&target, &action, &message()).await;

        assert_eq!(report.reacted, StepOutcome::Skipped);
        assert!(target.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_annotate_reaction_failure_is_swallowed() {
        let target = RecordingTarget {
            fail_react: true,
            ..Default::default()
        };
        let action = EnforcementAction::Annotate {
            note: "Politics".to_string(),
        };
        let report = Enforcer::new()
            .with_annotate_reaction("👀")
            .apply(&target, &action, &message())
            .await;

        assert_eq!(report.reacted, StepOutcome::Failed);
        assert_eq!(*target.calls.lock(), vec!["react:👀".to_string()]);
    }
}
