//! ntm-recovery: the Recovery-Context Builder (spec.md §4.4).
//!
//! - [`types`] — [`RecoveryContext`] and [`Diagnostic`], the assembled,
//!   possibly-truncated result.
//! - [`builder`] — the parallel fan-out to up to three optional external
//!   sources, graceful degradation, token-budgeted truncation.
//! - [`formatter`] — markdown rendering of a [`RecoveryContext`] into the
//!   priming prompt injected into a freshly spawned agent.
//! - [`errors`] — [`RecoveryError`] for the rare hard failure (a malformed
//!   on-disk checkpoint), as opposed to per-source degradation.

pub mod builder;
pub mod errors;
pub mod formatter;
pub mod types;

pub use builder::{build, BuildRequest};
pub use errors::RecoveryError;
pub use types::{Diagnostic, RecoveryContext};
