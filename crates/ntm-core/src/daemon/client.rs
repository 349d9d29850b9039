//! Domain-specific request helpers over `ntm_protocol::IpcConnection`.

use std::path::PathBuf;

use ntm_protocol::{ClientMessage, DaemonMessage, DaemonName, DaemonRecordWire, IpcConnection, IpcError};
use tracing::debug;
use uuid::Uuid;

/// A connection to `ntm-supervisord`'s control socket, bound to one socket
/// path. Each call opens a fresh connection — unlike the worktree daemon
/// this supersedes, supervisor calls are infrequent (spawn/start/stop/
/// status), so there is no thread-local connection cache to maintain.
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    socket_path: PathBuf,
}

impl SupervisorClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    fn connect(&self) -> Result<IpcConnection, IpcError> {
        IpcConnection::connect(&self.socket_path)
    }

    fn next_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// `true` if the supervisor answers a ping within the connection's
    /// default timeout.
    pub fn ping(&self) -> bool {
        let Ok(mut conn) = self.connect() else {
            return false;
        };
        let _ = conn.set_read_timeout(Some(std::time::Duration::from_millis(500)));
        conn.send(&ClientMessage::Ping { id: Self::next_id() })
            .is_ok()
    }

    pub fn start_daemon(
        &self,
        name: &str,
        command: String,
        args: Vec<String>,
        env: std::collections::HashMap<String, String>,
        default_port: Option<u16>,
        health_url: Option<String>,
    ) -> Result<DaemonRecordWire, IpcError> {
        let mut conn = self.connect()?;
        let response = conn.send(&ClientMessage::StartDaemon {
            id: Self::next_id(),
            name: DaemonName::new(name),
            command,
            args,
            env,
            default_port,
            health_url,
        })?;
        match response {
            DaemonMessage::DaemonStarted { record, .. } => {
                debug!(event = "core.supervisor_client.start_daemon_ok", name);
                Ok(record)
            }
            other => Err(IpcError::ProtocolError {
                message: format!("unexpected response to start_daemon: {other:?}"),
            }),
        }
    }

    pub fn stop_daemon(&self, name: &str) -> Result<(), IpcError> {
        let mut conn = self.connect()?;
        conn.send(&ClientMessage::StopDaemon {
            id: Self::next_id(),
            name: DaemonName::new(name),
        })?;
        Ok(())
    }

    pub fn get_daemon(&self, name: &str) -> Result<Option<DaemonRecordWire>, IpcError> {
        let mut conn = self.connect()?;
        let response = conn.send(&ClientMessage::GetDaemon {
            id: Self::next_id(),
            name: DaemonName::new(name),
        })?;
        match response {
            DaemonMessage::DaemonStatus { record, .. } => Ok(record),
            other => Err(IpcError::ProtocolError {
                message: format!("unexpected response to get_daemon: {other:?}"),
            }),
        }
    }

    pub fn status(&self) -> Result<Vec<DaemonRecordWire>, IpcError> {
        let mut conn = self.connect()?;
        let response = conn.send(&ClientMessage::Status { id: Self::next_id() })?;
        match response {
            DaemonMessage::StatusSnapshot { daemons, .. } => Ok(daemons),
            other => Err(IpcError::ProtocolError {
                message: format!("unexpected response to status: {other:?}"),
            }),
        }
    }

    pub fn shutdown(&self) -> Result<(), IpcError> {
        let mut conn = self.connect()?;
        conn.send(&ClientMessage::Shutdown { id: Self::next_id() })?;
        Ok(())
    }
}
