//! Manifest of the panes a `spawn` produced for a session (SPEC_FULL.md's
//! "Supplemented: SessionManifest"). `send`/`respawn`/`kill` run as
//! separate CLI invocations with no memory of the spawn that created a
//! session's panes, so the pane list, titles, and `AgentSpec`s are
//! persisted at `<project>/.ntm/sessions/{session}.json` and reloaded on
//! every later command that needs to target specific panes.

use serde::{Deserialize, Serialize};

use crate::errors::OrchestratorError;
use crate::orchestrator::PaneRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub session: String,
    pub panes: Vec<PaneRecord>,
}

pub fn write(paths: &ntm_paths::ProjectPaths, manifest: &SessionManifest) -> Result<(), OrchestratorError> {
    let dir = paths.sessions_dir();
    std::fs::create_dir_all(&dir)?;
    let path = paths.session_file(&manifest.session);
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read(
    paths: &ntm_paths::ProjectPaths,
    session: &str,
) -> Result<Option<SessionManifest>, OrchestratorError> {
    let path = paths.session_file(session);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn remove(paths: &ntm_paths::ProjectPaths, session: &str) -> Result<(), OrchestratorError> {
    let path = paths.session_file(session);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
