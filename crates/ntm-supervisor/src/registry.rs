//! The per-daemon state machine and registry (spec.md §4.2).
//!
//! Registry lock ordering: the top-level `RwLock<HashMap<..>>` is always
//! acquired before any individual `DaemonEntry`'s `record` lock, matching
//! spec.md §5's "registry lock ordered strictly before record locks." The
//! child process itself is owned exclusively by its `supervise` task — it
//! is never shared behind a lock, so `stop()` signals by PID instead of
//! reaching into the task's owned `Child`, which would otherwise deadlock
//! against the task's in-flight `child.wait()`.

use std::collections::HashMap;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid as NixPid;
use ntm_protocol::{DaemonRecordWire, DaemonState};
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::errors::SupervisorError;
use crate::types::{DaemonRecord, DaemonSpec, SupervisorConfig};

struct DaemonEntry {
    record: Mutex<DaemonRecord>,
    intentional_stop: AtomicBool,
}

/// Keeps a set of named background daemons alive on behalf of a session
/// (spec.md §4.2 `New`/`Start`/`Stop`/`Shutdown`/`GetDaemon`/`Status`).
pub struct Supervisor {
    config: SupervisorConfig,
    registry: RwLock<HashMap<String, Arc<DaemonEntry>>>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            registry: RwLock::new(HashMap::new()),
        })
    }

    fn project_paths(&self) -> ntm_paths::ProjectPaths {
        ntm_paths::ProjectPaths::for_project(&self.config.project_dir)
    }

    /// Before starting `name`: if its PID file exists and points at a live
    /// process running the same command, refuse with `InUse`; otherwise
    /// delete the stale (orphaned) entry.
    async fn reclaim_if_orphaned(&self, spec: &DaemonSpec) -> Result<(), SupervisorError> {
        let pid_path = self.project_paths().pid_file(&spec.name);
        let expected = spec.display_command();
        if let Some(record) = ntm_core::process::read_pid_file(&pid_path)? {
            if record.is_orphaned(&expected) {
                info!(
                    event = "supervisor.daemon.orphan_reclaimed",
                    name = %spec.name,
                    stale_pid = record.pid
                );
                ntm_core::process::delete_pid_file(&pid_path)?;
            } else {
                return Err(SupervisorError::InUse {
                    name: spec.name.clone(),
                    pid: record.pid,
                    command: record.command,
                });
            }
        }
        Ok(())
    }

    /// Probe `default_port`; if occupied, fall back to an OS-assigned
    /// ephemeral port by binding to port 0 and releasing it immediately.
    /// `None`/`Some(0)` means the daemon needs no port at all.
    fn assign_port(default_port: Option<u16>) -> Result<Option<u16>, SupervisorError> {
        match default_port {
            None | Some(0) => Ok(None),
            Some(p) => {
                if std::net::TcpListener::bind(("127.0.0.1", p)).is_ok() {
                    Ok(Some(p))
                } else {
                    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).map_err(|e| {
                        SupervisorError::PortAcquisitionFailed {
                            message: e.to_string(),
                        }
                    })?;
                    Ok(Some(listener.local_addr().unwrap().port()))
                }
            }
        }
    }

    fn spawn_child(
        spec: &DaemonSpec,
        port: Option<u16>,
    ) -> Result<tokio::process::Child, SupervisorError> {
        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args);
        for (k, v) in &spec.env {
            cmd.env(k, v);
        }
        if let Some(port) = port {
            cmd.env("NTM_DAEMON_PORT", port.to_string());
        }
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::inherit());
        cmd.spawn().map_err(|e| SupervisorError::SpawnFailed {
            name: spec.name.clone(),
            message: e.to_string(),
        })
    }

    fn write_pid(&self, spec: &DaemonSpec, pid: u32, port: Option<u16>) -> Result<(), SupervisorError> {
        let pid_path = self.project_paths().pid_file(&spec.name);
        ntm_core::process::write_pid_file(
            &pid_path,
            &ntm_core::process::PidRecord {
                pid,
                owner_id: self.config.session_id.clone(),
                command: spec.display_command(),
                started_at: Utc::now(),
                port: port.unwrap_or(0),
            },
        )?;
        Ok(())
    }

    /// `Start(spec)` — reclaim, assign a port, spawn, wait for the ready
    /// probe, and register a restart-supervising background task, which
    /// takes sole ownership of the spawned `Child`.
    pub async fn start(
        self: &Arc<Self>,
        spec: DaemonSpec,
    ) -> Result<DaemonRecordWire, SupervisorError> {
        self.reclaim_if_orphaned(&spec).await?;

        let port = Self::assign_port(spec.default_port)?;
        let mut child = Self::spawn_child(&spec, port)?;
        let pid = child.id();

        if let Some(pid) = pid {
            self.write_pid(&spec, pid, port)?;
        }

        wait_for_ready(&mut child, spec.health_url.as_deref(), port).await;

        let record = DaemonRecord {
            name: spec.name.clone(),
            state: if matches!(child.try_wait(), Ok(None)) {
                DaemonState::Running
            } else {
                DaemonState::Crashed
            },
            pid,
            port,
            started_at: Utc::now(),
            restart_count: 0,
            last_exit: None,
            command: spec.display_command(),
            health_url: spec.health_url.clone(),
        };

        let wire = record.to_wire();
        let entry = Arc::new(DaemonEntry {
            record: Mutex::new(record),
            intentional_stop: AtomicBool::new(false),
        });

        {
            let mut registry = self.registry.write().await;
            registry.insert(spec.name.clone(), entry.clone());
        }

        info!(event = "supervisor.daemon.started", name = %spec.name, pid, port);
        tokio::spawn(supervise(self.clone(), spec, entry, child));

        Ok(wire)
    }

    /// `Stop(name)` — mark intentional so the restart monitor stands down,
    /// signal SIGTERM by PID, poll for the monitor task to observe the
    /// exit and flip state to `Stopped`, SIGKILL after a 5s grace period.
    pub async fn stop(&self, name: &str) -> Result<(), SupervisorError> {
        let entry = {
            let registry = self.registry.read().await;
            registry.get(name).cloned()
        }
        .ok_or_else(|| SupervisorError::NotFound {
            name: name.to_string(),
        })?;

        entry.intentional_stop.store(true, Ordering::SeqCst);

        let pid = entry.record.lock().await.pid;
        if let Some(pid) = pid {
            let _ = signal::kill(NixPid::from_raw(pid as i32), Signal::SIGTERM);
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if entry.record.lock().await.state == DaemonState::Stopped {
                break;
            }
            if tokio::time::Instant::now() > deadline {
                if let Some(pid) = pid {
                    let _ = signal::kill(NixPid::from_raw(pid as i32), Signal::SIGKILL);
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mut record = entry.record.lock().await;
        record.state = DaemonState::Stopped;
        record.pid = None;
        drop(record);

        ntm_core::process::delete_pid_file(&self.project_paths().pid_file(name))?;
        info!(event = "supervisor.daemon.stopped", name);
        Ok(())
    }

    /// `Shutdown()` — stop every supervised daemon in parallel. Runs to
    /// completion once begun (non-cancellable per spec.md §5) so PID-file
    /// cleanup always happens.
    pub async fn shutdown(self: &Arc<Self>) -> Result<(), SupervisorError> {
        let names: Vec<String> = {
            let registry = self.registry.read().await;
            registry.keys().cloned().collect()
        };

        let grace = Duration::from_secs(5);
        let mut set = tokio::task::JoinSet::new();
        for name in names {
            let supervisor = self.clone();
            set.spawn(async move {
                let _ = tokio::time::timeout(grace, supervisor.stop(&name)).await;
            });
        }
        while set.join_next().await.is_some() {}
        info!(event = "supervisor.shutdown_completed");
        Ok(())
    }

    pub async fn get_daemon(&self, name: &str) -> Option<DaemonRecordWire> {
        let registry = self.registry.read().await;
        match registry.get(name) {
            Some(entry) => Some(entry.record.lock().await.to_wire()),
            None => None,
        }
    }

    pub async fn status(&self) -> Vec<DaemonRecordWire> {
        let registry = self.registry.read().await;
        let mut out = Vec::with_capacity(registry.len());
        for entry in registry.values() {
            out.push(entry.record.lock().await.to_wire());
        }
        out
    }
}

/// Poll a TCP health probe until it succeeds or a bounded window elapses,
/// or until the child exits early. `health_url`'s host/port is parsed
/// loosely; when absent or unparseable, the assigned `port` is probed
/// instead; when neither is available the daemon is considered ready as
/// soon as it spawns.
async fn wait_for_ready(child: &mut tokio::process::Child, health_url: Option<&str>, port: Option<u16>) {
    let probe_port = health_url.and_then(parse_port_from_url).or(port);

    let Some(probe_port) = probe_port else {
        return;
    };

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tokio::time::Instant::now() < deadline {
        if let Ok(Some(_)) = child.try_wait() {
            return; // exited before ready
        }
        if tokio::task::spawn_blocking(move || {
            TcpStream::connect_timeout(
                &format!("127.0.0.1:{probe_port}").parse().unwrap(),
                Duration::from_millis(200),
            )
            .is_ok()
        })
        .await
        .unwrap_or(false)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

fn parse_port_from_url(url: &str) -> Option<u16> {
    let after_scheme = url.split("://").nth(1).unwrap_or(url);
    let host_port = after_scheme.split('/').next()?;
    host_port.rsplit(':').next()?.parse().ok()
}

/// Owns `child` exclusively: waits for it to exit, then applies the
/// restart policy (spec.md §4.2) until `max_restarts` is exceeded or the
/// daemon is intentionally stopped, spawning and re-owning each
/// replacement child itself.
async fn supervise(
    supervisor: Arc<Supervisor>,
    spec: DaemonSpec,
    entry: Arc<DaemonEntry>,
    mut child: tokio::process::Child,
) {
    loop {
        let exit_status = child.wait().await.ok();

        if entry.intentional_stop.load(Ordering::SeqCst) {
            let mut record = entry.record.lock().await;
            record.state = DaemonState::Stopped;
            record.pid = None;
            return;
        }

        let restart_count = {
            let mut record = entry.record.lock().await;
            record.restart_count += 1;
            record.last_exit = exit_status.and_then(|s| s.code());
            record.state = DaemonState::Crashed;
            record.restart_count
        };

        warn!(
            event = "supervisor.daemon.crashed",
            name = %spec.name,
            restart_count,
            max_restarts = supervisor.config.max_restarts
        );

        if restart_count > supervisor.config.max_restarts {
            let mut record = entry.record.lock().await;
            record.state = DaemonState::Failed;
            record.pid = None;
            warn!(event = "supervisor.daemon.failed_permanently", name = %spec.name);
            return;
        }

        let backoff = std::cmp::min(
            supervisor.config.initial_restart_delay * 2u32.pow(restart_count.saturating_sub(1)),
            supervisor.config.restart_backoff_max,
        );
        tokio::time::sleep(backoff).await;

        if entry.intentional_stop.load(Ordering::SeqCst) {
            let mut record = entry.record.lock().await;
            record.state = DaemonState::Stopped;
            record.pid = None;
            return;
        }

        let port = entry.record.lock().await.port;

        match Supervisor::spawn_child(&spec, port) {
            Ok(mut new_child) => {
                let new_pid = new_child.id();
                wait_for_ready(&mut new_child, spec.health_url.as_deref(), port).await;

                if let Some(pid) = new_pid {
                    let _ = supervisor.write_pid(&spec, pid, port);
                }

                let mut record = entry.record.lock().await;
                record.pid = new_pid;
                record.state = if matches!(new_child.try_wait(), Ok(None)) {
                    DaemonState::Running
                } else {
                    DaemonState::Crashed
                };
                drop(record);

                info!(event = "supervisor.daemon.restarted", name = %spec.name, restart_count);
                child = new_child;
            }
            Err(e) => {
                warn!(event = "supervisor.daemon.restart_spawn_failed", name = %spec.name, error = %e);
                // Loop back around: next iteration's wait() on the stale
                // `child` handle returns immediately (already reaped),
                // which re-enters the backoff/restart accounting above.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn test_config(dir: &std::path::Path) -> SupervisorConfig {
        SupervisorConfig {
            session_id: "test-session".into(),
            project_dir: dir.to_path_buf(),
            health_interval: Duration::from_secs(30),
            max_restarts: 2,
            initial_restart_delay: Duration::from_millis(50),
            restart_backoff_max: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_start_then_status_then_stop() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = Supervisor::new(test_config(dir.path()));

        let spec = DaemonSpec {
            name: "sleeper".into(),
            command: "sleep".into(),
            args: vec!["5".into()],
            env: Map::new(),
            default_port: None,
            health_url: None,
        };

        let record = supervisor.start(spec).await.unwrap();
        assert_eq!(record.state, DaemonState::Running);
        assert!(record.pid.is_some());

        let status = supervisor.status().await;
        assert_eq!(status.len(), 1);

        supervisor.stop("sleeper").await.unwrap();
        let after = supervisor.get_daemon("sleeper").await.unwrap();
        assert_eq!(after.state, DaemonState::Stopped);
    }

    #[tokio::test]
    async fn test_start_rejects_in_use_orphan_with_live_pid() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let paths = ntm_paths::ProjectPaths::for_project(&config.project_dir);

        ntm_core::process::write_pid_file(
            &paths.pid_file("api"),
            &ntm_core::process::PidRecord {
                pid: std::process::id(),
                owner_id: "other-owner".into(),
                command: "sleep 5".into(),
                started_at: Utc::now(),
                port: 0,
            },
        )
        .unwrap();

        let supervisor = Supervisor::new(config);
        let spec = DaemonSpec {
            name: "api".into(),
            command: "sleep".into(),
            args: vec!["5".into()],
            env: Map::new(),
            default_port: None,
            health_url: None,
        };

        let result = supervisor.start(spec).await;
        assert!(matches!(result, Err(SupervisorError::InUse { .. })));
    }

    #[tokio::test]
    async fn test_start_reclaims_orphan_with_dead_pid() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let paths = ntm_paths::ProjectPaths::for_project(&config.project_dir);

        ntm_core::process::write_pid_file(
            &paths.pid_file("orphan"),
            &ntm_core::process::PidRecord {
                pid: 2_147_483_647,
                owner_id: "gone".into(),
                command: "sleep".into(),
                started_at: Utc::now(),
                port: 0,
            },
        )
        .unwrap();

        let supervisor = Supervisor::new(config);
        let spec = DaemonSpec {
            name: "orphan".into(),
            command: "sleep".into(),
            args: vec!["5".into()],
            env: Map::new(),
            default_port: None,
            health_url: None,
        };

        let record = supervisor.start(spec).await.unwrap();
        assert_ne!(record.pid, Some(2_147_483_647));
    }

    #[tokio::test]
    async fn test_stop_unknown_daemon_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = Supervisor::new(test_config(dir.path()));
        let result = supervisor.stop("nope").await;
        assert!(matches!(result, Err(SupervisorError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_assign_port_zero_is_none() {
        assert_eq!(Supervisor::assign_port(Some(0)).unwrap(), None);
        assert_eq!(Supervisor::assign_port(None).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restart_backoff_cap_reaches_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.max_restarts = 2;
        config.initial_restart_delay = Duration::from_millis(50);
        config.restart_backoff_max = Duration::from_millis(200);
        let supervisor = Supervisor::new(config);

        // A command that exits immediately with failure.
        let spec = DaemonSpec {
            name: "quick-exit".into(),
            command: "false".into(),
            args: vec![],
            env: Map::new(),
            default_port: None,
            health_url: None,
        };

        supervisor.start(spec).await.unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(record) = supervisor.get_daemon("quick-exit").await {
                if record.state == DaemonState::Failed {
                    assert!(record.restart_count > 2);
                    return;
                }
            }
            if tokio::time::Instant::now() > deadline {
                panic!("daemon did not reach Failed state in time");
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
