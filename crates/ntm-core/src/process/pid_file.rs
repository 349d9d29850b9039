//! On-disk PID file records for supervised auxiliary daemons.
//!
//! `{project}/.ntm/pids/{name}.pid` holds a JSON [`PidRecord`]. Per
//! spec.md §3: "when a PIDFile exists and its PID is alive and matches
//! `command`, the daemon is considered in use by its `owner_id`; otherwise
//! the entry is orphaned and may be reclaimed." [`PidRecord::is_orphaned`]
//! is the single source of truth for that check, used by the Supervisor
//! before every `Start`.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::process::errors::ProcessError;
use crate::process::is_process_alive;
use crate::process::types::Pid;

/// `{pid, owner_id, command, started_at, port}` — see spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidRecord {
    pub pid: u32,
    pub owner_id: String,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub port: u16,
}

impl PidRecord {
    /// A record is orphaned when its PID is no longer alive, or when a
    /// live PID has been recycled by the OS for an unrelated command.
    pub fn is_orphaned(&self, expected_command: &str) -> bool {
        if !is_process_alive(Pid::from_raw(self.pid)) {
            return true;
        }
        self.command != expected_command
    }
}

/// Ensure `{project}/.ntm/pids/` exists, creating it if necessary.
pub fn ensure_pid_dir(pids_dir: &Path) -> Result<(), ProcessError> {
    if !pids_dir.exists() {
        fs::create_dir_all(pids_dir).map_err(|e| ProcessError::PidFileError {
            path: pids_dir.to_path_buf(),
            message: format!("failed to create pids directory: {e}"),
        })?;
        debug!(event = "core.pid_file.dir_created", path = %pids_dir.display());
    }
    Ok(())
}

/// Read and parse a PID file. `Ok(None)` when the file does not exist.
pub fn read_pid_file(path: &Path) -> Result<Option<PidRecord>, ProcessError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| ProcessError::PidFileError {
        path: path.to_path_buf(),
        message: format!("failed to read pid file: {e}"),
    })?;
    let record: PidRecord =
        serde_json::from_str(&content).map_err(|e| ProcessError::PidFileError {
            path: path.to_path_buf(),
            message: format!("failed to parse pid file: {e}"),
        })?;
    Ok(Some(record))
}

/// Write a PID file record, creating the parent directory if needed.
/// Uses a temp-file-then-rename to avoid partial writes being read by a
/// concurrent reconciler.
pub fn write_pid_file(path: &Path, record: &PidRecord) -> Result<(), ProcessError> {
    if let Some(parent) = path.parent() {
        ensure_pid_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(record).map_err(|e| ProcessError::PidFileError {
        path: path.to_path_buf(),
        message: format!("failed to serialize pid record: {e}"),
    })?;

    let tmp_path = path.with_extension("pid.tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| ProcessError::PidFileError {
            path: tmp_path.clone(),
            message: format!("failed to create pid file: {e}"),
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| ProcessError::PidFileError {
                path: tmp_path.clone(),
                message: format!("failed to write pid file: {e}"),
            })?;
    }
    fs::rename(&tmp_path, path).map_err(|e| ProcessError::PidFileError {
        path: path.to_path_buf(),
        message: format!("failed to finalize pid file: {e}"),
    })?;
    debug!(event = "core.pid_file.written", path = %path.display(), pid = record.pid);
    Ok(())
}

/// Delete a PID file. A missing file is not an error — deletion is
/// idempotent, matching the Supervisor's `Shutdown()` contract.
pub fn delete_pid_file(path: &Path) -> Result<(), ProcessError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| ProcessError::PidFileError {
            path: path.to_path_buf(),
            message: format!("failed to delete pid file: {e}"),
        })?;
        debug!(event = "core.pid_file.deleted", path = %path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(pid: u32, command: &str) -> PidRecord {
        PidRecord {
            pid,
            owner_id: "supervisor-1".to_string(),
            command: command.to_string(),
            started_at: Utc::now(),
            port: 0,
        }
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.pid");
        let record = sample(std::process::id(), "mail-broker");
        write_pid_file(&path, &record).unwrap();

        let read = read_pid_file(&path).unwrap().unwrap();
        assert_eq!(read, record);
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.pid");
        assert!(read_pid_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.pid");
        assert!(delete_pid_file(&path).is_ok());
        write_pid_file(&path, &sample(1, "x")).unwrap();
        assert!(delete_pid_file(&path).is_ok());
        assert!(!path.exists());
        assert!(delete_pid_file(&path).is_ok());
    }

    #[test]
    fn test_orphaned_when_pid_dead() {
        let record = sample(2_147_483_647, "mail-broker");
        assert!(record.is_orphaned("mail-broker"));
    }

    #[test]
    fn test_orphaned_when_command_mismatch_even_if_alive() {
        let record = sample(std::process::id(), "old-command");
        assert!(record.is_orphaned("mail-broker"));
    }

    #[test]
    fn test_not_orphaned_when_alive_and_command_matches() {
        let record = sample(std::process::id(), "mail-broker");
        assert!(!record.is_orphaned("mail-broker"));
    }

    #[test]
    fn test_ensure_pid_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let pids_dir = dir.path().join("nested").join("pids");
        ensure_pid_dir(&pids_dir).unwrap();
        assert!(pids_dir.is_dir());
    }
}
