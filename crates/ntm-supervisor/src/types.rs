use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ntm_protocol::{DaemonName, DaemonRecordWire, DaemonState};

/// Tuning knobs for one `Supervisor` instance (spec.md §4.2 `New(config)`).
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub session_id: String,
    pub project_dir: PathBuf,
    pub health_interval: std::time::Duration,
    pub max_restarts: u32,
    pub initial_restart_delay: std::time::Duration,
    pub restart_backoff_max: std::time::Duration,
}

/// `Start(spec)` request body.
#[derive(Debug, Clone)]
pub struct DaemonSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub default_port: Option<u16>,
    pub health_url: Option<String>,
}

impl DaemonSpec {
    /// Canonical display command used both for the PID file's `command`
    /// field and orphan-reconciliation matching.
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Per-daemon mutable state tracked by the registry (spec.md §3
/// `DaemonRecord`).
#[derive(Debug, Clone)]
pub struct DaemonRecord {
    pub name: String,
    pub state: DaemonState,
    pub pid: Option<u32>,
    pub port: Option<u16>,
    pub started_at: DateTime<Utc>,
    pub restart_count: u32,
    pub last_exit: Option<i32>,
    pub command: String,
    pub health_url: Option<String>,
}

impl DaemonRecord {
    pub fn to_wire(&self) -> DaemonRecordWire {
        DaemonRecordWire {
            name: DaemonName::new(self.name.clone()),
            state: self.state,
            pid: self.pid,
            port: self.port,
            started_at: self.started_at.to_rfc3339(),
            restart_count: self.restart_count,
            last_exit: self.last_exit,
            command: self.command.clone(),
            health_url: self.health_url.clone(),
        }
    }
}

/// Load supervisor tuning from `ntm-config`, applied when `ntm-supervisord`
/// starts (not re-read until restart — config is a boot-time concern).
pub fn load_daemon_config(
    session_id: String,
    project_dir: PathBuf,
) -> Result<SupervisorConfig, Box<dyn std::error::Error>> {
    let config = ntm_config::NtmConfig::load_hierarchy()?;
    Ok(SupervisorConfig {
        session_id,
        project_dir,
        health_interval: std::time::Duration::from_secs(config.supervisor.health_interval_secs()),
        max_restarts: config.supervisor.max_restarts(),
        initial_restart_delay: std::time::Duration::from_secs(
            config.supervisor.initial_restart_delay_secs(),
        ),
        restart_backoff_max: std::time::Duration::from_secs(
            config.supervisor.restart_backoff_max_secs(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command_with_args() {
        let spec = DaemonSpec {
            name: "api".into(),
            command: "npm".into(),
            args: vec!["run".into(), "dev".into()],
            env: HashMap::new(),
            default_port: None,
            health_url: None,
        };
        assert_eq!(spec.display_command(), "npm run dev");
    }

    #[test]
    fn test_display_command_without_args() {
        let spec = DaemonSpec {
            name: "mail".into(),
            command: "mail-broker".into(),
            args: vec![],
            env: HashMap::new(),
            default_port: None,
            health_url: None,
        };
        assert_eq!(spec.display_command(), "mail-broker");
    }

    #[test]
    fn test_to_wire_roundtrip_fields() {
        let record = DaemonRecord {
            name: "api".into(),
            state: DaemonState::Running,
            pid: Some(42),
            port: Some(8080),
            started_at: Utc::now(),
            restart_count: 1,
            last_exit: None,
            command: "npm run dev".into(),
            health_url: None,
        };
        let wire = record.to_wire();
        assert_eq!(wire.pid, Some(42));
        assert_eq!(wire.restart_count, 1);
    }
}
