//! Readiness polling and the idle-marker heuristic (spec.md §4.3 steps 1-2).

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use ntm_orchestrator::{PaneKind, PaneRecord, TerminalAdapter};

use crate::errors::AssignError;

const SCROLLBACK_LINES: usize = 10;

/// A pane is idle if any configured marker matches anywhere in its last
/// `SCROLLBACK_LINES` lines of scrollback (at the tail or earlier in that
/// window both count, per spec.md §4.3 step 2).
pub fn is_pane_idle(scrollback: &str, idle_markers: &[String]) -> bool {
    let tail: Vec<&str> = scrollback.lines().rev().take(SCROLLBACK_LINES).collect();
    tail.iter()
        .any(|line| idle_markers.iter().any(|marker| line.contains(marker.as_str())))
}

/// Poll every `poll_interval` until all non-user panes are idle or
/// `timeout` elapses (spec.md §4.3 step 1). Returns, per pane id, how long
/// this poll loop has continuously observed that pane as idle — the
/// `speed` strategy's "idle longest" tie-break (§4.3 step 4) reads this.
pub async fn wait_for_ready(
    adapter: &dyn TerminalAdapter,
    session: &str,
    panes: &[PaneRecord],
    idle_markers: &[String],
    poll_interval: Duration,
    timeout: Duration,
) -> Result<HashMap<String, Duration>, AssignError> {
    let agent_panes: Vec<&PaneRecord> = panes.iter().filter(|p| p.kind == PaneKind::Agent).collect();
    if agent_panes.is_empty() {
        return Err(AssignError::NoReadyPanes);
    }

    let start = tokio::time::Instant::now();
    let deadline = start + timeout;
    let mut idle_since: HashMap<String, tokio::time::Instant> = HashMap::new();

    loop {
        let now = tokio::time::Instant::now();
        let mut all_idle = true;
        for pane in &agent_panes {
            let scrollback = adapter
                .capture_pane(session, &pane.pane, SCROLLBACK_LINES)
                .unwrap_or_default();
            if is_pane_idle(&scrollback, idle_markers) {
                idle_since.entry(pane.pane.0.clone()).or_insert(now);
            } else {
                idle_since.remove(&pane.pane.0);
                all_idle = false;
                debug!(event = "assign.pane_busy", pane = %pane.pane, "pane not yet idle");
            }
        }

        if all_idle {
            let now = tokio::time::Instant::now();
            return Ok(idle_since
                .into_iter()
                .map(|(pane, since)| (pane, now.duration_since(since)))
                .collect());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(AssignError::ReadyTimeout);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["$ ".to_string(), "Ready for instructions".to_string()]
    }

    #[test]
    fn test_idle_marker_at_tail_is_idle() {
        let scrollback = "compiling...\nwarning: unused\nmy-project $ ";
        assert!(is_pane_idle(scrollback, &markers()));
    }

    #[test]
    fn test_no_marker_present_is_busy() {
        let scrollback = "compiling...\nwarning: unused\nstill running";
        assert!(!is_pane_idle(scrollback, &markers()));
    }

    #[test]
    fn test_marker_anywhere_in_window_counts_as_idle() {
        let scrollback = "Ready for instructions\nthinking...\nmore output";
        assert!(is_pane_idle(scrollback, &markers()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_ready_times_out_when_never_idle() {
        let adapter = ntm_orchestrator::FakeAdapter::new();
        adapter.create_session("lt-1", std::path::Path::new("/tmp")).unwrap();
        let pane = adapter.split_pane("lt-1").unwrap();
        adapter.push_scrollback("lt-1", &pane, "still working");

        let panes = vec![PaneRecord {
            pane,
            kind: PaneKind::Agent,
            title: "lt-1__claude_1".to_string(),
            spec: None,
            scheduled_delay: None,
        }];

        let result = wait_for_ready(
            &adapter,
            "lt-1",
            &panes,
            &markers(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        )
        .await;
        assert!(matches!(result, Err(AssignError::ReadyTimeout)));
    }

    #[tokio::test]
    async fn test_wait_for_ready_returns_ok_when_idle() {
        let adapter = ntm_orchestrator::FakeAdapter::new();
        adapter.create_session("lt-1", std::path::Path::new("/tmp")).unwrap();
        let pane = adapter.split_pane("lt-1").unwrap();
        adapter.push_scrollback("lt-1", &pane, "my-project $ ");

        let panes = vec![PaneRecord {
            pane,
            kind: PaneKind::Agent,
            title: "lt-1__claude_1".to_string(),
            spec: None,
            scheduled_delay: None,
        }];

        let result = wait_for_ready(
            &adapter,
            "lt-1",
            &panes,
            &markers(),
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .await;
        assert!(result.is_ok());
    }
}
