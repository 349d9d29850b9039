//! Shared value types and JSONL IPC protocol between the `ntm` CLI and the
//! `ntmd` supervisor daemon.

pub mod client;
mod messages;
mod types;

pub use client::{IpcConnection, IpcError};
pub use messages::{ClientMessage, DaemonMessage, ErrorCode};
pub use types::{
    AgentKind, BeadId, DaemonName, DaemonRecordWire, DaemonState, PaneId, SessionName,
};
