//! Session/Pane Orchestrator (spec.md §4.1): `Spawn`, `Kill`, `Send`.
//!
//! > Given a target session name and a flattened list of AgentSpecs, ensure
//! > the session exists with the correct number of panes, assign titles,
//! > launch the right agent command in each pane with a well-formed
//! > environment, optionally seed each agent with recovery context and a
//! > user prompt, and return a structured spawn result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ntm_config::NtmConfig;
use ntm_core::agents::AgentSpec;
use ntm_core::collaborators::{MailClient, MemoryClient};
use ntm_protocol::PaneId;

use crate::adapter::TerminalAdapter;
use crate::errors::OrchestratorError;
use crate::name::is_valid_session_name;
use crate::spawn_state::{self, SpawnState, SpawnStateEntry};
use crate::stagger::{run_stagger_batch, StaggerEntry};

/// Resolve the project-scoped `.ntm` directory for `cwd`: non-interactive
/// mode never prompts, it simply uses `cwd` as the project root (spec.md
/// §4.1 step 2, SPEC_FULL.md's "Supplemented: ProjectHandle"). Creating the
/// directory itself is left to whichever path helper needs it first
/// (`ntm_paths::ProjectPaths`), matching the teacher's lazy
/// `create_dir_all`-on-write convention.
pub fn resolve_project_dir(cwd: &Path) -> ntm_paths::ProjectPaths {
    ntm_paths::ProjectPaths::for_project(cwd)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaneKind {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneRecord {
    pub pane: PaneId,
    pub kind: PaneKind,
    pub title: String,
    pub spec: Option<AgentSpec>,
    /// Scheduled delay from batch start, when staggered.
    pub scheduled_delay: Option<Duration>,
}

/// Per-collaborator outcome attached to a [`SpawnResult`] (SPEC_FULL.md
/// "Supplemented: RegistrationStatus") — step 9 requires surfacing, not
/// silently dropping, registration failures as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    Registered,
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct SpawnResult {
    pub session: String,
    pub panes: Vec<PaneRecord>,
    pub agent_count: usize,
    pub batch_id: Option<String>,
    pub mail_registration: RegistrationStatus,
    pub memory_registration: RegistrationStatus,
    pub warnings: Vec<String>,
}

pub struct SpawnRequest<'a> {
    pub session: String,
    pub cwd: PathBuf,
    pub specs: Vec<AgentSpec>,
    pub user_pane: bool,
    pub prompt: Option<String>,
    pub stagger: Option<Duration>,
    pub safety: bool,
    pub config: &'a NtmConfig,
    pub mail: &'a dyn MailClient,
    pub memory: &'a dyn MemoryClient,
    pub cancel: CancellationToken,
}

pub enum TargetSelector {
    Pane(usize),
    AgentKinds(Vec<ntm_protocol::AgentKind>),
    AllAgents,
    AllPanes,
}

pub struct Orchestrator {
    adapter: Arc<dyn TerminalAdapter>,
}

impl Orchestrator {
    pub fn new(adapter: Arc<dyn TerminalAdapter>) -> Self {
        Self { adapter }
    }

    /// spec.md §4.1 steps 1-9.
    pub async fn spawn(&self, request: SpawnRequest<'_>) -> Result<SpawnResult, OrchestratorError> {
        if !is_valid_session_name(&request.session) {
            return Err(OrchestratorError::InvalidName(request.session));
        }

        let exists = self.adapter.session_exists(&request.session)?;
        if request.safety && exists {
            return Err(OrchestratorError::SessionExists(request.session));
        }

        let project = resolve_project_dir(&request.cwd);
        std::fs::create_dir_all(project.project_dir())?;

        if !exists {
            self.adapter.create_session(&request.session, &request.cwd)?;
        }

        let needed = (request.user_pane as usize) + request.specs.len();
        while self.adapter.pane_count(&request.session)? < needed {
            self.adapter.split_pane(&request.session)?;
        }
        let pane_ids = self.adapter.list_panes(&request.session)?;

        if request.cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let mut panes = Vec::with_capacity(needed);
        if request.user_pane {
            let pane = pane_ids
                .first()
                .cloned()
                .ok_or_else(|| OrchestratorError::Adapter(crate::errors::AdapterError::PaneNotFound(
                    "0".to_string(),
                    request.session.clone(),
                )))?;
            panes.push(PaneRecord {
                pane,
                kind: PaneKind::User,
                title: format!("{}__user", request.session),
                spec: None,
                scheduled_delay: None,
            });
        }

        let start_ordinal = request.user_pane as usize;
        let batch_id = uuid::Uuid::new_v4().to_string();
        let stagger_interval = request.stagger.filter(|d| !d.is_zero());

        for (i, spec) in request.specs.iter().enumerate() {
            if request.cancel.is_cancelled() {
                return Ok(SpawnResult {
                    session: request.session,
                    panes,
                    agent_count: i,
                    batch_id: None,
                    mail_registration: RegistrationStatus::Skipped,
                    memory_registration: RegistrationStatus::Skipped,
                    warnings: vec!["spawn cancelled before all panes launched".to_string()],
                });
            }

            let pane_index = start_ordinal + i;
            let pane = pane_ids.get(pane_index).cloned().ok_or_else(|| {
                OrchestratorError::Adapter(crate::errors::AdapterError::PaneNotFound(
                    pane_index.to_string(),
                    request.session.clone(),
                ))
            })?;
            let title = spec.pane_title(&request.session);
            self.adapter.set_pane_title(&request.session, &pane, &title)?;

            let command = request
                .config
                .get_agent_command(&spec.kind.to_string())
                .map_err(|e| OrchestratorError::NoAgentCommand(e.to_string()))?;

            let delay = stagger_interval.map(|s| s.saturating_mul(i as u32));
            let env = spawn_context_env(
                &request.session,
                &batch_id,
                i as u32 + 1,
                request.specs.len() as u32,
                delay,
            );
            self.adapter
                .spawn_in_pane(&request.session, &pane, &command, &env)?;

            panes.push(PaneRecord {
                pane,
                kind: PaneKind::Agent,
                title,
                spec: Some(spec.clone()),
                scheduled_delay: delay,
            });
        }

        let mut warnings = Vec::new();
        let mut persisted_batch = None;

        if let (Some(interval), Some(prompt)) = (stagger_interval, request.prompt.clone()) {
            let entries: Vec<StaggerEntry> = panes
                .iter()
                .filter(|p| p.kind == PaneKind::Agent)
                .enumerate()
                .map(|(i, p)| StaggerEntry {
                    pane: p.pane.clone(),
                    ordinal: i as u32,
                })
                .collect();

            let state = SpawnState {
                batch_id: batch_id.clone(),
                agent_count: entries.len(),
                entries: entries
                    .iter()
                    .map(|e| SpawnStateEntry {
                        pane_id: e.pane.to_string(),
                        order: e.ordinal,
                        scheduled_at_ms: (e.ordinal as u64) * interval.as_millis() as u64,
                        sent: false,
                    })
                    .collect(),
            };
            spawn_state::write(&project, &state)?;
            persisted_batch = Some(batch_id.clone());

            let result = run_stagger_batch(
                Arc::clone(&self.adapter),
                request.session.clone(),
                prompt,
                entries,
                interval,
                request.cancel.clone(),
            )
            .await;

            spawn_state::remove(&project, &batch_id)?;
            persisted_batch = None;
            result?;
        } else if let Some(prompt) = request.prompt.clone() {
            for p in panes.iter().filter(|p| p.kind == PaneKind::Agent) {
                if let Err(e) = self.adapter.send_keys(&request.session, &p.pane, &prompt) {
                    warnings.push(format!("failed to deliver prompt to {}: {e}", p.title));
                }
            }
        }

        let mail_registration = probe_registration("mail", || request.mail.recent_messages(&request.session, 1)).await;
        let memory_registration =
            probe_registration("memory", || request.memory.rules(&request.session, 1)).await;

        if let RegistrationStatus::Failed { reason } = &mail_registration {
            warnings.push(format!("mail registration degraded: {reason}"));
        }
        if let RegistrationStatus::Failed { reason } = &memory_registration {
            warnings.push(format!("memory registration degraded: {reason}"));
        }

        crate::session_state::write(
            &project,
            &crate::session_state::SessionManifest {
                session: request.session.clone(),
                panes: panes.clone(),
            },
        )?;

        info!(event = "orchestrator.spawn", session = %request.session, agents = request.specs.len(), "spawn complete");

        Ok(SpawnResult {
            session: request.session,
            agent_count: request.specs.len(),
            panes,
            batch_id: persisted_batch,
            mail_registration,
            memory_registration,
            warnings,
        })
    }

    /// Idempotent: killing an already-gone session is not an error.
    pub fn kill(&self, session: &str) -> Result<(), OrchestratorError> {
        match self.adapter.kill_session(session) {
            Ok(()) => {
                info!(event = "orchestrator.kill", session, "session killed");
                Ok(())
            }
            Err(crate::errors::AdapterError::SessionNotFound(_)) => {
                warn!(event = "orchestrator.kill", session, "session already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn send(
        &self,
        session: &str,
        prompt: &str,
        panes: &[PaneRecord],
        selector: TargetSelector,
    ) -> Result<usize, OrchestratorError> {
        if !self.adapter.session_exists(session)? {
            return Err(OrchestratorError::SessionNotFound(session.to_string()));
        }

        let targets: Vec<&PaneRecord> = match &selector {
            TargetSelector::Pane(index) => panes.iter().filter(|p| pane_ordinal(p) == Some(*index)).collect(),
            TargetSelector::AgentKinds(kinds) => panes
                .iter()
                .filter(|p| matches!(&p.spec, Some(s) if kinds.contains(&s.kind)))
                .collect(),
            TargetSelector::AllAgents => panes.iter().filter(|p| p.kind == PaneKind::Agent).collect(),
            TargetSelector::AllPanes => panes.iter().collect(),
        };

        for p in &targets {
            self.adapter.send_keys(session, &p.pane, prompt)?;
        }
        Ok(targets.len())
    }

}

fn pane_ordinal(p: &PaneRecord) -> Option<usize> {
    p.pane.0.trim_start_matches('%').parse().ok()
}

/// spec.md §6 "Environment injected into agent processes": `NTM_SPAWN_BATCH_ID`,
/// `NTM_SPAWN_ORDER` (1-based), `NTM_SPAWN_TOTAL`, `NTM_SPAWN_DELAY_MS`, and
/// the session name.
fn spawn_context_env(
    session: &str,
    batch_id: &str,
    order: u32,
    total: u32,
    delay: Option<Duration>,
) -> Vec<(String, String)> {
    vec![
        ("NTM_SESSION".to_string(), session.to_string()),
        ("NTM_SPAWN_BATCH_ID".to_string(), batch_id.to_string()),
        ("NTM_SPAWN_ORDER".to_string(), order.to_string()),
        ("NTM_SPAWN_TOTAL".to_string(), total.to_string()),
        (
            "NTM_SPAWN_DELAY_MS".to_string(),
            delay.map(|d| d.as_millis().to_string()).unwrap_or_else(|| "0".to_string()),
        ),
    ]
}

/// Best-effort reachability probe standing in for an explicit registration
/// RPC neither collaborator trait exposes (spec.md §4.1 step 9: failure to
/// register must degrade gracefully, not fail the spawn).
async fn probe_registration<F, Fut, T>(name: &str, call: F) -> RegistrationStatus
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ntm_core::collaborators::CollaboratorError>>,
{
    match call().await {
        Ok(_) => RegistrationStatus::Registered,
        Err(e) => {
            warn!(event = "orchestrator.registration_failed", collaborator = name, error = %e, "collaborator registration degraded");
            RegistrationStatus::Failed { reason: e.to_string() }
        }
    }
}
