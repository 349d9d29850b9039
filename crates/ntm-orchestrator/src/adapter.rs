//! `TerminalAdapter` — the typed seam onto the terminal multiplexer: a
//! narrow, synchronous set of session/pane primitives. The real,
//! shelling-out implementation lives in `ntm-tmux::TmuxAdapter`; the
//! in-memory [`FakeAdapter`] below lives alongside the trait so the
//! Orchestrator can be exercised without a real terminal.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use ntm_protocol::PaneId;

use crate::errors::AdapterError;

pub trait TerminalAdapter: Send + Sync {
    fn session_exists(&self, name: &str) -> Result<bool, AdapterError>;
    fn create_session(&self, name: &str, cwd: &Path) -> Result<(), AdapterError>;
    fn kill_session(&self, name: &str) -> Result<(), AdapterError>;
    fn pane_count(&self, session: &str) -> Result<usize, AdapterError>;
    /// The session's panes in creation order. Pane ids are assigned by the
    /// multiplexer (tmux's `%N` counter is global, not per-session), so
    /// callers must not assume a pane's id encodes its position — list and
    /// index into this instead.
    fn list_panes(&self, session: &str) -> Result<Vec<PaneId>, AdapterError>;
    fn split_pane(&self, session: &str) -> Result<PaneId, AdapterError>;
    fn set_pane_title(&self, session: &str, pane: &PaneId, title: &str) -> Result<(), AdapterError>;
    fn send_keys(&self, session: &str, pane: &PaneId, text: &str) -> Result<(), AdapterError>;
    fn capture_pane(&self, session: &str, pane: &PaneId, lines: usize) -> Result<String, AdapterError>;
    fn spawn_in_pane(
        &self,
        session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError>;
    /// Kill whatever is running in `pane` and relaunch `command` in it,
    /// keeping the same pane id (`respawn`, spec.md §6).
    fn respawn_pane(
        &self,
        session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, Default)]
struct FakePane {
    title: String,
    command: Option<String>,
    env: Vec<(String, String)>,
    /// Keystrokes sent to this pane, in order — what `send_keys` tests
    /// against.
    sent: Vec<String>,
}

#[derive(Debug, Default)]
struct FakeSession {
    panes: Vec<FakePane>,
}

/// An in-memory [`TerminalAdapter`] for unit and integration tests. Panes
/// are appended in `split_pane` order; `send_keys` records keystrokes
/// instead of running a real program, and `capture_pane` plays back the
/// last pane command plus every sent keystroke — enough for the Assignment
/// Engine's readiness heuristic (idle markers) to be exercised in tests.
#[derive(Default)]
pub struct FakeAdapter {
    sessions: Mutex<HashMap<String, FakeSession>>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: the keystrokes sent to a pane, in order.
    pub fn sent_keys(&self, session: &str, pane: &PaneId) -> Vec<String> {
        let sessions = self.sessions.lock().unwrap();
        sessions
            .get(session)
            .and_then(|s| s.panes.get(pane_index(pane)))
            .map(|p| p.sent.clone())
            .unwrap_or_default()
    }

    /// Test helper: append arbitrary scrollback content a readiness check
    /// should see (e.g. a shell prompt to simulate an idle pane).
    pub fn push_scrollback(&self, session: &str, pane: &PaneId, line: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(s) = sessions.get_mut(session) {
            if let Some(p) = s.panes.get_mut(pane_index(pane)) {
                p.sent.push(line.to_string());
            }
        }
    }
}

fn pane_index(pane: &PaneId) -> usize {
    pane.0.trim_start_matches('%').parse().unwrap_or(0)
}

impl TerminalAdapter for FakeAdapter {
    fn session_exists(&self, name: &str) -> Result<bool, AdapterError> {
        Ok(self.sessions.lock().unwrap().contains_key(name))
    }

    fn create_session(&self, name: &str, _cwd: &Path) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(name.to_string())
            .or_insert_with(FakeSession::default);
        Ok(())
    }

    fn kill_session(&self, name: &str) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.remove(name).is_none() {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    fn pane_count(&self, session: &str) -> Result<usize, AdapterError> {
        let sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        Ok(s.panes.len())
    }

    fn list_panes(&self, session: &str) -> Result<Vec<PaneId>, AdapterError> {
        let sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        Ok((0..s.panes.len()).map(|i| PaneId(format!("%{i}"))).collect())
    }

    fn split_pane(&self, session: &str) -> Result<PaneId, AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get_mut(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let index = s.panes.len();
        s.panes.push(FakePane::default());
        Ok(PaneId(format!("%{index}")))
    }

    fn set_pane_title(&self, session: &str, pane: &PaneId, title: &str) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get_mut(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let p = s
            .panes
            .get_mut(pane_index(pane))
            .ok_or_else(|| AdapterError::PaneNotFound(pane.to_string(), session.to_string()))?;
        p.title = title.to_string();
        Ok(())
    }

    fn send_keys(&self, session: &str, pane: &PaneId, text: &str) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get_mut(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let p = s
            .panes
            .get_mut(pane_index(pane))
            .ok_or_else(|| AdapterError::PaneNotFound(pane.to_string(), session.to_string()))?;
        p.sent.push(text.to_string());
        Ok(())
    }

    fn capture_pane(&self, session: &str, pane: &PaneId, lines: usize) -> Result<String, AdapterError> {
        let sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let p = s
            .panes
            .get(pane_index(pane))
            .ok_or_else(|| AdapterError::PaneNotFound(pane.to_string(), session.to_string()))?;
        let all: Vec<&str> = p.sent.iter().map(String::as_str).collect();
        Ok(all.iter().rev().take(lines).rev().cloned().collect::<Vec<_>>().join("\n"))
    }

    fn spawn_in_pane(
        &self,
        session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get_mut(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let p = s
            .panes
            .get_mut(pane_index(pane))
            .ok_or_else(|| AdapterError::PaneNotFound(pane.to_string(), session.to_string()))?;
        p.command = Some(command.to_string());
        p.env = env.to_vec();
        Ok(())
    }

    fn respawn_pane(
        &self,
        session: &str,
        pane: &PaneId,
        command: &str,
        env: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let mut sessions = self.sessions.lock().unwrap();
        let s = sessions
            .get_mut(session)
            .ok_or_else(|| AdapterError::SessionNotFound(session.to_string()))?;
        let p = s
            .panes
            .get_mut(pane_index(pane))
            .ok_or_else(|| AdapterError::PaneNotFound(pane.to_string(), session.to_string()))?;
        p.command = Some(command.to_string());
        p.env = env.to_vec();
        p.sent.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_session_exists() {
        let adapter = FakeAdapter::new();
        assert!(!adapter.session_exists("lt-1").unwrap());
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        assert!(adapter.session_exists("lt-1").unwrap());
    }

    #[test]
    fn test_split_pane_grows_count() {
        let adapter = FakeAdapter::new();
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        adapter.split_pane("lt-1").unwrap();
        adapter.split_pane("lt-1").unwrap();
        assert_eq!(adapter.pane_count("lt-1").unwrap(), 2);
    }

    #[test]
    fn test_list_panes_matches_split_order() {
        let adapter = FakeAdapter::new();
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        let first = adapter.split_pane("lt-1").unwrap();
        let second = adapter.split_pane("lt-1").unwrap();
        assert_eq!(adapter.list_panes("lt-1").unwrap(), vec![first, second]);
    }

    #[test]
    fn test_kill_removes_session() {
        let adapter = FakeAdapter::new();
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        adapter.kill_session("lt-1").unwrap();
        assert!(!adapter.session_exists("lt-1").unwrap());
    }

    #[test]
    fn test_kill_unknown_session_errors() {
        let adapter = FakeAdapter::new();
        assert!(adapter.kill_session("nope").is_err());
    }

    #[test]
    fn test_send_keys_then_capture_pane() {
        let adapter = FakeAdapter::new();
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        let pane = adapter.split_pane("lt-1").unwrap();
        adapter.send_keys("lt-1", &pane, "Hello").unwrap();
        let captured = adapter.capture_pane("lt-1", &pane, 10).unwrap();
        assert!(captured.contains("Hello"));
    }
}
