//! Per-batch manifest of pending staggered prompt deliveries (spec.md §3
//! "SpawnState", §6 on-disk layout `<project>/.ntm/spawn_state/{batch_id}.json`).
//!
//! Persisted only while a staggered batch is in flight, so an external
//! observer (e.g. `ntm status`) can report progress; removed shortly after
//! the batch completes.

use serde::{Deserialize, Serialize};

use crate::errors::OrchestratorError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnStateEntry {
    pub pane_id: String,
    pub order: u32,
    pub scheduled_at_ms: u64,
    pub sent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnState {
    pub batch_id: String,
    pub agent_count: usize,
    pub entries: Vec<SpawnStateEntry>,
}

pub fn write(paths: &ntm_paths::ProjectPaths, state: &SpawnState) -> Result<(), OrchestratorError> {
    let path = paths.spawn_state_file(&state.batch_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn remove(paths: &ntm_paths::ProjectPaths, batch_id: &str) -> Result<(), OrchestratorError> {
    let path = paths.spawn_state_file(batch_id);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

pub fn read(
    paths: &ntm_paths::ProjectPaths,
    batch_id: &str,
) -> Result<Option<SpawnState>, OrchestratorError> {
    let path = paths.spawn_state_file(batch_id);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ntm_paths::ProjectPaths::for_project(dir.path());
        let state = SpawnState {
            batch_id: "batch-1".to_string(),
            agent_count: 2,
            entries: vec![SpawnStateEntry {
                pane_id: "%1".to_string(),
                order: 1,
                scheduled_at_ms: 0,
                sent: false,
            }],
        };
        write(&paths, &state).unwrap();
        let read_back = read(&paths, "batch-1").unwrap().unwrap();
        assert_eq!(read_back.agent_count, 2);

        remove(&paths, "batch-1").unwrap();
        assert!(read(&paths, "batch-1").unwrap().is_none());
    }

    #[test]
    fn test_read_missing_batch_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ntm_paths::ProjectPaths::for_project(dir.path());
        assert!(read(&paths, "missing").unwrap().is_none());
    }
}
