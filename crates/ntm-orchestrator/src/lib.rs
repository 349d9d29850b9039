//! Session/Pane Orchestrator (spec.md §4.1): owns session and pane
//! lifecycle for a fleet of agent panes hosted in a terminal multiplexer,
//! stagger-scheduled prompt delivery, and the `Send`/`Kill` operations.
//!
//! The multiplexer itself is an external collaborator (spec.md §1); this
//! crate talks to it only through the [`adapter::TerminalAdapter`] seam.
//! `ntm-tmux` provides the real, shelling-out implementation;
//! [`adapter::FakeAdapter`] is the in-memory test double used throughout
//! this crate's own test suite.

pub mod adapter;
pub mod errors;
pub mod name;
pub mod orchestrator;
pub mod session_state;
pub mod spawn_state;
pub mod stagger;

pub use adapter::{FakeAdapter, TerminalAdapter};
pub use errors::{AdapterError, OrchestratorError};
pub use name::is_valid_session_name;
pub use orchestrator::{
    resolve_project_dir, Orchestrator, PaneKind, PaneRecord, RegistrationStatus, SpawnRequest,
    SpawnResult, TargetSelector,
};
pub use session_state::SessionManifest;
pub use spawn_state::SpawnState;
pub use stagger::StaggerEntry;
