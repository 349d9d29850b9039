//! Assignment Engine (spec.md §4.3): waits for agent readiness, fetches
//! ranked work items from the external triage collaborator, dispatches
//! them to panes per a chosen strategy, and tracks assignment lifecycle
//! through to `Clear`/`ClearPane`/`ClearFailed`.

pub mod engine;
pub mod errors;
pub mod readiness;
pub mod strategy;
pub mod types;

pub use engine::{AssignContext, AssignOutcome, AssignmentEngine};
pub use errors::AssignError;
pub use readiness::{is_pane_idle, wait_for_ready};
pub use strategy::{select, AgentSlot};
pub use types::{
    filter_assignments, Assignment, AssignmentFilter, AssignmentStatus, ClearOutcome, ClearResult,
    ClearSummary, Strategy,
};
