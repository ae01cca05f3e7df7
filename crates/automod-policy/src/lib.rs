//! automod Policy
//!
//! Turns safety verdicts into moderation effects.
//!
//! - [`ModerationPolicy`] decides, per group, what a verdict calls for
//! - [`Enforcer`] carries the decision out against the chat platform
//! - [`GroupConfigStore`] holds which groups have moderation enabled

pub mod action;
pub mod engine;
pub mod executor;
pub mod store;

pub use action::{EnforcementAction, UNSPECIFIED_REASON};
pub use engine::ModerationPolicy;
pub use executor::{Enforcer, EnforcementReport, ModerationTarget, StepOutcome};
pub use store::GroupConfigStore;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::EnforcementAction;
    pub use crate::engine::ModerationPolicy;
    pub use crate::executor::{Enforcer, ModerationTarget};
    pub use crate::store::GroupConfigStore;
}
