//! The real, shelling-out [`TerminalAdapter`] implementation, grounded on
//! `oj-adapters`' `TmuxAdapter`
//! (`examples/groblegark-oddjobs/crates/adapters/src/session/tmux.rs`):
//! same command/flag shapes (new-session -d -s, has-session, kill-session,
//! send-keys -l/--/Enter, capture-pane -p -S, list-panes -F, set-option),
//! translated from that crate's async `tokio::process::Command` calls to
//! synchronous `std::process::Command` ones, since
//! [`ntm_orchestrator::TerminalAdapter`] is a synchronous trait (its own
//! callers run it from a blocking-pool thread when needed — see
//! `ntm-orchestrator::stagger`).
//!
//! Tmux pane identifiers (`%N`) are globally unique, so callers can target
//! a pane directly without qualifying it with its session name.

use std::path::Path;
use std::process::{Command, Output};

use tracing::warn;

use ntm_orchestrator::{AdapterError, TerminalAdapter};
use ntm_protocol::PaneId;

#[derive(Debug, Clone, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str]) -> Result<Output, AdapterError> {
        Command::new("tmux")
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AdapterError::NotInstalled
                } else {
                    AdapterError::CommandFailed(e.to_string())
                }
            })
    }

    fn run_ok(&self, args: &[&str]) -> Result<Output, AdapterError> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::CommandFailed(stderr.trim().to_string()));
        }
        Ok(output)
    }
}

impl TerminalAdapter for TmuxAdapter {
    fn session_exists(&self, name: &str) -> Result<bool, AdapterError> {
        let output = self.run(&["has-session", "-t", name])?;
        Ok(output.status.success())
    }

    fn create_session(&self, name: &str, cwd: &Path) -> Result<(), AdapterError> {
        let cwd_str = cwd.to_string_lossy();
        self.run_ok(&["new-session", "-d", "-s", name, "-c", &cwd_str])?;
        Ok(())
    }

    fn kill_session(&self, name: &str) -> Result<(), AdapterError> {
        if !self.session_exists(name)? {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        // Best-effort: a session that dies between the check above and
        // this call is not a failure worth surfacing.
        let _ = self.run(&["kill-session", "-t", name]);
        Ok(())
    }

    fn pane_count(&self, session: &str) -> Result<usize, AdapterError> {
        Ok(self.list_panes(session)?.len())
    }

    fn list_panes(&self, session: &str) -> Result<Vec<PaneId>, AdapterError> {
        let output = self.run_ok(&["list-panes", "-t", session, "-F", "#{pane_id}"])?;
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| PaneId(l.to_string()))
            .collect())
    }

    fn split_pane(&self, session: &str) -> Result<PaneId, AdapterError> {
        let output = self.run_ok(&["split-window", "-t", session, "-P", "-F", "#{pane_id}"])?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(AdapterError::CommandFailed(
                "tmux split-window returned no pane id".to_string(),
            ));
        }
        Ok(PaneId(id))
    }

    fn set_pane_title(&self, _session: &str, pane: &PaneId, title: &str) -> Result<(), AdapterError> {
        if let Err(e) = self.run_ok(&["select-pane", "-t", &pane.0, "-T", title]) {
            warn!(event = "tmux.set_pane_title_failed", pane = %pane.0, error = %e, "non-fatal: pane title not set");
        }
        Ok(())
    }

    fn send_keys(&self, _session: &str, pane: &PaneId, text: &str) -> Result<(), AdapterError> {
        self.run_ok(&["send-keys", "-t", &pane.0, "-l", "--", text])?;
        self.run_ok(&["send-keys", "-t", &pane.0, "Enter"])?;
        Ok(())
    }

    fn capture_pane(&self, _session: &str, pane: &PaneId, lines: usize) -> Result<String, AdapterError> {
        let history = format!("-{lines}");
        let output = self.run_ok(&["capture-pane", "-t", &pane.0, "-p", "-S", &history])?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn spawn_in_pane(
        &self,
        _session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let line = env_prefixed_command(command, env);
        self.run_ok(&["send-keys", "-t", &pane.0, "-l", "--", &line])?;
        self.run_ok(&["send-keys", "-t", &pane.0, "Enter"])?;
        Ok(())
    }

    fn respawn_pane(
        &self,
        _session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let line = env_prefixed_command(command, env);
        self.run_ok(&["respawn-pane", "-k", "-t", &pane.0, &line])?;
        Ok(())
    }
}

fn env_prefixed_command(command: &str, env: &[(String, String)]) -> String {
    let mut line = String::new();
    for (key, value) in env {
        line.push_str(&format!("{key}={} ", shell_quote(value)));
    }
    line.push_str(command);
    line
}

/// Minimal single-quote escaping for values interpolated into a shell
/// command line sent via `send-keys`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
