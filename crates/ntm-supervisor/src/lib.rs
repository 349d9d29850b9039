//! ntm-supervisord: the resident auxiliary-daemon supervisor (spec.md §4.2).
//!
//! Owns a registry of named background processes (mail brokers, dev
//! servers, anything a project wants kept alive alongside a session),
//! restarting them with exponential backoff on crash and reclaiming
//! orphaned PID files left by an unclean shutdown. Exposes its control
//! surface as a JSONL protocol over a Unix domain socket ([`server`]),
//! built on the message types in `ntm-protocol`.

pub mod errors;
pub mod registry;
pub mod server;
pub mod types;

pub use errors::SupervisorError;
pub use registry::Supervisor;
pub use types::{load_daemon_config, DaemonRecord, DaemonSpec, SupervisorConfig};
