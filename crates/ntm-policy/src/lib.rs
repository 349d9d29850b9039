//! ntm-policy: the command-safety policy engine (spec.md §4.5).
//!
//! - [`types`] — the on-disk document shape and the flattened match/stats
//!   types callers see.
//! - [`engine`] — [`Policy`], the compiled, checkable rule set.
//! - [`log`] — the append-only blocked-command log.
//! - [`errors`] — [`PolicyError`].

pub mod engine;
pub mod errors;
pub mod log;
pub mod types;

pub use engine::Policy;
pub use errors::PolicyError;
pub use types::{
    Action, AutomationConfig, BlockedEntry, ForceRelease, PolicyDocument, PolicyMatch, PolicyStats,
    RawRule,
};
