//! Centralized path construction for NTM's on-disk layout.
//!
//! Two roots exist side by side (see the on-disk layout in the design doc):
//!
//! - `~/.ntm/` — user-scoped: the policy document, wrapper binaries, the
//!   blocked-command log, and the supervisor's daemon control socket/PID file.
//! - `<project>/.ntm/` — project-scoped: PID files for auxiliary daemons,
//!   staggered spawn-state manifests, the scan cache, and the assignment
//!   table.
//!
//! [`NtmHome`] and [`ProjectPaths`] are the single source of truth for each
//! root respectively. Use `resolve()`/`for_project()` in production code and
//! `from_dir()` in tests.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found — set $HOME environment variable")]
    HomeNotFound,
}

/// Paths rooted at `~/.ntm/`.
#[derive(Debug, Clone)]
pub struct NtmHome {
    home_dir: PathBuf,
}

impl NtmHome {
    /// Resolve paths from the user's home directory (`~/.ntm`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            home_dir: home.join(".ntm"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// The base `~/.ntm` directory.
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.home_dir.join("bin")
    }

    pub fn config_file(&self) -> PathBuf {
        self.home_dir.join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.home_dir.join("logs")
    }

    /// spec.md's glossary names this file `policy.yaml`; it is serialized
    /// as TOML instead (see DESIGN.md) to match every other on-disk
    /// document in this workspace, so the extension follows the content.
    pub fn policy_file(&self) -> PathBuf {
        self.home_dir.join("policy.toml")
    }

    pub fn blocked_log_file(&self) -> PathBuf {
        self.logs_dir().join("blocked.jsonl")
    }

    pub fn git_wrapper(&self) -> PathBuf {
        self.bin_dir().join("git")
    }

    pub fn rm_wrapper(&self) -> PathBuf {
        self.bin_dir().join("rm")
    }

    pub fn daemon_socket(&self) -> PathBuf {
        self.home_dir.join("ntmd.sock")
    }

    pub fn daemon_pid_file(&self) -> PathBuf {
        self.home_dir.join("ntmd.pid")
    }

    pub fn claude_hook(&self) -> PathBuf {
        self.home_dir
            .join("..")
            .join(".claude")
            .join("hooks")
            .join("PreToolUse")
            .join("ntm-safety.sh")
    }
}

/// Paths rooted at `<project>/.ntm/`.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    project_dir: PathBuf,
}

impl ProjectPaths {
    /// Derive project paths from a project working directory.
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            project_dir: project_root.join(".ntm"),
        }
    }

    /// Create paths from an explicit `.ntm` directory. Use in tests.
    pub fn from_dir(project_dir: PathBuf) -> Self {
        Self { project_dir }
    }

    /// The base `<project>/.ntm` directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn pids_dir(&self) -> PathBuf {
        self.project_dir.join("pids")
    }

    pub fn pid_file(&self, daemon_name: &str) -> PathBuf {
        let safe_name = sanitize(daemon_name);
        self.pids_dir().join(format!("{safe_name}.pid"))
    }

    pub fn spawn_state_dir(&self) -> PathBuf {
        self.project_dir.join("spawn_state")
    }

    pub fn spawn_state_file(&self, batch_id: &str) -> PathBuf {
        self.spawn_state_dir().join(format!("{batch_id}.json"))
    }

    pub fn scan_cache_file(&self) -> PathBuf {
        self.project_dir.join("scan_cache.json")
    }

    pub fn assignments_file(&self) -> PathBuf {
        self.project_dir.join("assignments.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.project_dir.join("config.toml")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.project_dir.join("sessions")
    }

    /// Manifest of the panes a `spawn` created for `session`, reloaded by
    /// later `send`/`respawn`/`kill` invocations (separate processes with no
    /// memory of the original spawn).
    pub fn session_file(&self, session: &str) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", sanitize(session)))
    }
}

/// Sanitize a daemon/session name fragment so it is safe to embed in a
/// filename (replaces path separators with `-`).
fn sanitize(name: &str) -> String {
    name.replace('/', "-")
}
