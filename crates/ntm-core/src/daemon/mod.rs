//! Client-side helpers for talking to the `ntm-supervisord` control socket.
//!
//! The Supervisor itself (the state machine in spec.md §4.2) lives in the
//! `ntm-supervisor` crate and runs as a separate resident process; this
//! module is the CLI-side seam that speaks `ntm-protocol`'s JSONL messages
//! to it, plus the logic to auto-start it when it isn't running yet.

pub mod autostart;
pub mod client;
pub mod errors;

pub use autostart::ensure_supervisor_running;
pub use client::SupervisorClient;
pub use errors::DaemonAutoStartError;
