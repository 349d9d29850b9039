//! The Assignment Engine itself (spec.md §4.3): readiness, fetch, select,
//! bind, and the `Clear`/`ClearPane`/`ClearFailed` family.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use ntm_core::collaborators::{MailClient, TriageClient};
use ntm_orchestrator::{PaneKind, PaneRecord, TerminalAdapter};

use crate::errors::AssignError;
use crate::readiness::wait_for_ready;
use crate::strategy::{select, AgentSlot};
use crate::types::{Assignment, AssignmentStatus, ClearOutcome, ClearResult, ClearSummary, Strategy};

pub struct AssignContext<'a> {
    pub session: String,
    pub adapter: &'a dyn TerminalAdapter,
    pub panes: &'a [PaneRecord],
    pub triage: &'a dyn TriageClient,
    pub mail: &'a dyn MailClient,
    pub idle_markers: Vec<String>,
    pub poll_interval: Duration,
    pub ready_timeout: Duration,
    pub strategy: Strategy,
    pub limit: usize,
    pub reserve_files: bool,
}

#[derive(Debug, Default)]
pub struct AssignOutcome {
    pub assigned: Vec<Assignment>,
    pub warnings: Vec<String>,
}

/// In-memory assignment store for one project, persisted as a flat JSON
/// array (`<project>/.ntm/assignments.json`).
#[derive(Debug, Default)]
pub struct AssignmentEngine {
    assignments: Vec<Assignment>,
}

impl AssignmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, AssignError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(ntm_orchestrator::OrchestratorError::from)?;
        let assignments = serde_json::from_str(&content).unwrap_or_default();
        Ok(Self { assignments })
    }

    pub fn save(&self, path: &Path) -> Result<(), AssignError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ntm_orchestrator::OrchestratorError::from)?;
        }
        let json = serde_json::to_string_pretty(&self.assignments)
            .map_err(ntm_orchestrator::OrchestratorError::from)?;
        std::fs::write(path, json).map_err(ntm_orchestrator::OrchestratorError::from)?;
        Ok(())
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// The most recent row for `bead_id` that hasn't already been cleared
    /// (i.e. not `Reassigned`) — active *or* terminal (`Completed`/
    /// `Failed`), since `clear_one` must be able to report
    /// `ALREADY_COMPLETED` and `clear_failed` must be able to target
    /// `Failed` rows. A `Reassigned` row is excluded so clearing an
    /// already-cleared assignment reports `NotAssigned` (spec.md §8).
    fn clearable_assignment(&self, bead_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .rev()
            .find(|a| a.bead_id == bead_id && a.status != AssignmentStatus::Reassigned)
    }

    /// spec.md §4.3 steps 1-6.
    pub async fn assign(&mut self, ctx: AssignContext<'_>) -> Result<AssignOutcome, AssignError> {
        let idle_durations = wait_for_ready(
            ctx.adapter,
            &ctx.session,
            ctx.panes,
            &ctx.idle_markers,
            ctx.poll_interval,
            ctx.ready_timeout,
        )
        .await?;

        let agent_panes: Vec<&PaneRecord> = ctx.panes.iter().filter(|p| p.kind == PaneKind::Agent).collect();
        let agents: Vec<AgentSlot> = agent_panes
            .iter()
            .enumerate()
            .map(|(ordinal, p)| AgentSlot {
                pane: ordinal,
                agent_type: p.spec.as_ref().map(|s| s.kind.to_string()).unwrap_or_default(),
                idle_for: idle_durations.get(&p.pane.0).copied().unwrap_or_default(),
            })
            .collect();

        let candidates = ctx.triage.candidates(&ctx.session).await?;

        let completed_ids: HashSet<String> = self
            .assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Completed)
            .map(|a| a.bead_id.clone())
            .collect();

        let already_active: HashSet<&str> = self
            .assignments
            .iter()
            .filter(|a| a.status.is_active())
            .map(|a| a.bead_id.as_str())
            .collect();
        let fresh_candidates: Vec<_> = candidates
            .into_iter()
            .filter(|c| !already_active.contains(c.bead_id.as_str()))
            .collect();

        let selections = select(ctx.strategy, &fresh_candidates, &agents, &completed_ids, ctx.limit);

        let mut outcome = AssignOutcome::default();
        for (item, slot) in selections {
            let pane_record = agent_panes[slot.pane];
            if let Err(e) = ctx.adapter.send_keys(&ctx.session, &pane_record.pane, &item.title) {
                outcome.warnings.push(format!("failed to deliver instructions for {}: {e}", item.bead_id));
                continue;
            }

            if ctx.reserve_files {
                if let Err(e) = ctx.mail.reserve_files(&item.bead_id, &[]).await {
                    warn!(event = "assign.reservation_failed", bead_id = %item.bead_id, error = %e, "file reservation degraded");
                    outcome.warnings.push(format!("file reservation failed for {}: {e}", item.bead_id));
                }
            }

            let assignment = Assignment {
                bead_id: item.bead_id.clone(),
                bead_title: item.title.clone(),
                agent_type: slot.agent_type.clone(),
                pane: slot.pane,
                status: AssignmentStatus::Assigned,
                assigned_at: Utc::now().to_rfc3339(),
                file_reservations: Vec::new(),
            };

            info!(event = "assign.bind", bead_id = %assignment.bead_id, pane = assignment.pane, "bead assigned");
            self.assignments.push(assignment.clone());
            outcome.assigned.push(assignment);
        }

        Ok(outcome)
    }

    pub async fn clear(
        &mut self,
        bead_ids: &[String],
        force: bool,
        mail: &dyn MailClient,
    ) -> (Vec<ClearResult>, ClearSummary) {
        let mut results = Vec::with_capacity(bead_ids.len());
        for bead_id in bead_ids {
            let outcome = self.clear_one(bead_id, force, mail).await;
            results.push(ClearResult {
                bead_id: bead_id.clone(),
                outcome,
            });
        }
        let summary = ClearSummary::tally(&results);
        (results, summary)
    }

    pub async fn clear_pane(
        &mut self,
        pane: usize,
        force: bool,
        mail: &dyn MailClient,
    ) -> (Vec<ClearResult>, ClearSummary) {
        let bead_ids: Vec<String> = self
            .assignments
            .iter()
            .filter(|a| a.pane == pane && a.status.is_active())
            .map(|a| a.bead_id.clone())
            .collect();
        self.clear(&bead_ids, force, mail).await
    }

    pub async fn clear_failed(&mut self, mail: &dyn MailClient) -> (Vec<ClearResult>, ClearSummary) {
        let bead_ids: Vec<String> = self
            .assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Failed)
            .map(|a| a.bead_id.clone())
            .collect();
        self.clear(&bead_ids, true, mail).await
    }

    async fn clear_one(&mut self, bead_id: &str, force: bool, mail: &dyn MailClient) -> ClearOutcome {
        let Some(existing) = self.clearable_assignment(bead_id) else {
            return ClearOutcome::NotAssigned;
        };

        if existing.status == AssignmentStatus::Completed && !force {
            return ClearOutcome::AlreadyCompleted;
        }

        let files_released = match mail.release_files(bead_id).await {
            Ok(files) => files,
            Err(e) => {
                warn!(event = "assign.release_failed", bead_id, error = %e, "file release degraded");
                Vec::new()
            }
        };

        if let Some(assignment) = self
            .assignments
            .iter_mut()
            .rev()
            .find(|a| a.bead_id == bead_id && a.status != AssignmentStatus::Reassigned)
        {
            assignment.status = AssignmentStatus::Reassigned;
        }

        info!(event = "assign.clear", bead_id, released = files_released.len(), "assignment cleared");
        ClearOutcome::Cleared { files_released }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ntm_core::collaborators::{CollaboratorError, FileReservation, InboxMessage, MemoryNote, WorkItem};

    struct StubTriage(Vec<WorkItem>);

    #[async_trait]
    impl TriageClient for StubTriage {
        async fn candidates(&self, _session: &str) -> Result<Vec<WorkItem>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct StubMail;

    #[async_trait]
    impl MailClient for StubMail {
        async fn recent_messages(&self, _session: &str, _limit: usize) -> Result<Vec<InboxMessage>, CollaboratorError> {
            Ok(Vec::new())
        }
        async fn file_reservations(&self, _session: &str) -> Result<Vec<FileReservation>, CollaboratorError> {
            Ok(Vec::new())
        }
        async fn reserve_files(&self, _bead_id: &str, _paths: &[String]) -> Result<(), CollaboratorError> {
            Ok(())
        }
        async fn release_files(&self, _bead_id: &str) -> Result<Vec<String>, CollaboratorError> {
            Ok(vec!["src/lib.rs".to_string()])
        }
    }

    fn work_item(id: &str) -> WorkItem {
        WorkItem {
            bead_id: id.to_string(),
            title: format!("implement {id}"),
            agent_type: None,
            dependencies: Vec::new(),
        }
    }

    fn agent_pane(ordinal: u32) -> PaneRecord {
        PaneRecord {
            pane: ntm_protocol::PaneId(format!("%{ordinal}")),
            kind: PaneKind::Agent,
            title: format!("lt-1__claude_{ordinal}"),
            spec: Some(ntm_core::agents::AgentSpec::new(ntm_protocol::AgentKind::Claude, ordinal, "claude")),
            scheduled_delay: None,
        }
    }

    #[tokio::test]
    async fn test_assign_binds_candidates_to_idle_panes() {
        let adapter = ntm_orchestrator::FakeAdapter::new();
        adapter.create_session("lt-1", std::path::Path::new("/tmp")).unwrap();
        let pane = adapter.split_pane("lt-1").unwrap();
        adapter.push_scrollback("lt-1", &pane, "$ ");

        let panes = vec![PaneRecord {
            pane,
            ..agent_pane(1)
        }];
        let triage = StubTriage(vec![work_item("b1")]);
        let mail = StubMail;

        let mut engine = AssignmentEngine::new();
        let outcome = engine
            .assign(AssignContext {
                session: "lt-1".to_string(),
                adapter: &adapter,
                panes: &panes,
                triage: &triage,
                mail: &mail,
                idle_markers: vec!["$ ".to_string()],
                poll_interval: Duration::from_millis(5),
                ready_timeout: Duration::from_secs(1),
                strategy: Strategy::Balanced,
                limit: 0,
                reserve_files: false,
            })
            .await
            .unwrap();

        assert_eq!(outcome.assigned.len(), 1);
        assert_eq!(engine.assignments().len(), 1);
        assert_eq!(engine.assignments()[0].status, AssignmentStatus::Assigned);
    }

    #[tokio::test]
    async fn test_clear_unassigned_bead_reports_not_assigned() {
        let mut engine = AssignmentEngine::new();
        let mail = StubMail;
        let (results, summary) = engine.clear(&["missing".to_string()], false, &mail).await;
        assert_eq!(results[0].outcome, ClearOutcome::NotAssigned);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.cleared, 0);
    }

    #[tokio::test]
    async fn test_clear_completed_without_force_reports_already_completed() {
        let mut engine = AssignmentEngine::new();
        engine.assignments.push(Assignment {
            bead_id: "b1".to_string(),
            bead_title: "t".to_string(),
            agent_type: "claude".to_string(),
            pane: 1,
            status: AssignmentStatus::Completed,
            assigned_at: "2026-01-01T00:00:00Z".to_string(),
            file_reservations: Vec::new(),
        });
        let mail = StubMail;
        let (results, _) = engine.clear(&["b1".to_string()], false, &mail).await;
        assert_eq!(results[0].outcome, ClearOutcome::AlreadyCompleted);
    }

    #[tokio::test]
    async fn test_clear_with_force_clears_completed_and_releases_files() {
        let mut engine = AssignmentEngine::new();
        engine.assignments.push(Assignment {
            bead_id: "b1".to_string(),
            bead_title: "t".to_string(),
            agent_type: "claude".to_string(),
            pane: 1,
            status: AssignmentStatus::Completed,
            assigned_at: "2026-01-01T00:00:00Z".to_string(),
            file_reservations: Vec::new(),
        });
        let mail = StubMail;
        let (results, summary) = engine.clear(&["b1".to_string()], true, &mail).await;
        assert!(matches!(&results[0].outcome, ClearOutcome::Cleared { files_released } if files_released.len() == 1));
        assert_eq!(summary.reservations_released, 1);
    }

    #[tokio::test]
    async fn test_clear_failed_only_targets_failed_assignments() {
        let mut engine = AssignmentEngine::new();
        engine.assignments.push(Assignment {
            bead_id: "b1".to_string(),
            bead_title: "t".to_string(),
            agent_type: "claude".to_string(),
            pane: 1,
            status: AssignmentStatus::Failed,
            assigned_at: "2026-01-01T00:00:00Z".to_string(),
            file_reservations: Vec::new(),
        });
        engine.assignments.push(Assignment {
            bead_id: "b2".to_string(),
            bead_title: "t".to_string(),
            agent_type: "claude".to_string(),
            pane: 2,
            status: AssignmentStatus::Working,
            assigned_at: "2026-01-01T00:00:00Z".to_string(),
            file_reservations: Vec::new(),
        });
        let mail = StubMail;
        let (results, summary) = engine.clear_failed(&mail).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].bead_id, "b1");
        assert_eq!(summary.cleared, 1);
    }
}
