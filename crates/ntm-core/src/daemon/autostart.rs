use std::path::PathBuf;
use std::time::{Duration, Instant};

use ntm_config::NtmConfig;
use ntm_paths::NtmHome;
use tracing::{error, info, warn};

use super::client::SupervisorClient;
use super::errors::DaemonAutoStartError;

/// Locate `ntm-supervisord` alongside the currently running `ntm` binary.
fn find_sibling_binary(name: &str) -> Result<PathBuf, String> {
    let exe = std::env::current_exe().map_err(|e| e.to_string())?;
    let dir = exe
        .parent()
        .ok_or_else(|| "executable has no parent directory".to_string())?;
    let candidate = dir.join(name);
    if candidate.exists() {
        Ok(candidate)
    } else {
        // Fall back to PATH lookup for non-colocated installs (e.g. cargo
        // install placing the two binaries in the same bin dir, which the
        // branch above already covers, or a package manager layout that
        // doesn't).
        Ok(PathBuf::from(name))
    }
}

/// Ensure `ntm-supervisord` is running, auto-starting it if configured.
///
/// 1. Pings the control socket — if alive, returns immediately.
/// 2. Checks `config.supervisor.auto_start()` — if disabled, `Disabled`.
/// 3. Spawns `ntm-supervisord` detached, stderr inherited for diagnosis.
/// 4. Polls the socket + ping with a 5s timeout, 100ms interval, checking
///    for early child exit each iteration.
pub fn ensure_supervisor_running(
    config: &NtmConfig,
    home: &NtmHome,
) -> Result<(), DaemonAutoStartError> {
    let client = SupervisorClient::new(home.daemon_socket());
    if client.ping() {
        return Ok(());
    }

    if !config.supervisor.auto_start() {
        return Err(DaemonAutoStartError::Disabled);
    }

    info!(event = "core.supervisor.auto_start_started");
    eprintln!("Starting ntm-supervisord...");

    let binary = find_sibling_binary("ntm-supervisord")
        .map_err(|message| DaemonAutoStartError::BinaryNotFound { message })?;

    let mut child = std::process::Command::new(&binary)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::inherit())
        .stdin(std::process::Stdio::null())
        .spawn()
        .map_err(|e| DaemonAutoStartError::SpawnFailed {
            message: e.to_string(),
        })?;

    let socket = home.daemon_socket();
    let timeout = Duration::from_secs(5);
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                error!(event = "core.supervisor.auto_start_failed", reason = "child_exited", status = %status);
                return Err(DaemonAutoStartError::SpawnFailed {
                    message: format!(
                        "ntm-supervisord exited with {status} before becoming ready (binary: {})",
                        binary.display()
                    ),
                });
            }
            Ok(None) => {}
            Err(e) => warn!(event = "core.supervisor.child_status_check_failed", error = %e),
        }

        if socket.exists() && client.ping() {
            info!(event = "core.supervisor.auto_start_completed");
            eprintln!("ntm-supervisord started.");
            return Ok(());
        }

        if start.elapsed() > timeout {
            error!(event = "core.supervisor.auto_start_failed", reason = "timeout");
            return Err(DaemonAutoStartError::Timeout {
                message: "ntm-supervisord did not become ready within 5s".to_string(),
            });
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_when_auto_start_false_and_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let home = NtmHome::from_dir(dir.path().to_path_buf());
        let mut config = NtmConfig::default();
        config.supervisor.auto_start = Some(false);

        let result = ensure_supervisor_running(&config, &home);
        assert!(matches!(result, Err(DaemonAutoStartError::Disabled)));
    }

    #[test]
    fn test_default_config_has_auto_start_enabled() {
        assert!(NtmConfig::default().supervisor.auto_start());
    }
}
