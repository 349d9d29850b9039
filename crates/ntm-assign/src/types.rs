//! Data model for the Assignment Engine (spec.md §3 "Assignment", §4.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Working,
    Completed,
    Failed,
    Reassigned,
}

impl AssignmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Failed | AssignmentStatus::Reassigned)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub bead_id: String,
    pub bead_title: String,
    pub agent_type: String,
    pub pane: usize,
    pub status: AssignmentStatus,
    pub assigned_at: String,
    pub file_reservations: Vec<String>,
}

/// Dispatch strategy requested for an `assign` call (spec.md §4.3
/// "Inputs").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Balanced,
    Speed,
    Quality,
    Dependency,
    RoundRobin,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balanced" => Ok(Strategy::Balanced),
            "speed" => Ok(Strategy::Speed),
            "quality" => Ok(Strategy::Quality),
            "dependency" => Ok(Strategy::Dependency),
            "round-robin" => Ok(Strategy::RoundRobin),
            other => Err(format!("unknown assignment strategy '{other}'")),
        }
    }
}

/// Per-bead-id outcome of a `Clear` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared { files_released: Vec<String> },
    NotAssigned,
    AlreadyCompleted,
}

#[derive(Debug, Clone)]
pub struct ClearResult {
    pub bead_id: String,
    pub outcome: ClearOutcome,
}

/// Batch counters for a `Clear`/`ClearPane`/`ClearFailed` call (spec.md
/// §4.3 "Summary counters").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearSummary {
    pub cleared: usize,
    pub failed: usize,
    pub reservations_released: usize,
}

impl ClearSummary {
    pub fn tally(results: &[ClearResult]) -> Self {
        let mut summary = ClearSummary::default();
        for r in results {
            match &r.outcome {
                ClearOutcome::Cleared { files_released } => {
                    summary.cleared += 1;
                    summary.reservations_released += files_released.len();
                }
                ClearOutcome::NotAssigned | ClearOutcome::AlreadyCompleted => {
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
    pub agent_type: Option<String>,
    pub pane: Option<usize>,
}

/// A pure filter over assignments (spec.md §4.3 "Filtering"): empty
/// constraints mean "no constraint", order is preserved, and it never
/// panics regardless of input.
pub fn filter_assignments<'a>(
    assignments: &'a [Assignment],
    filter: &AssignmentFilter,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| filter.status.is_none_or(|s| a.status == s))
        .filter(|a| filter.agent_type.as_deref().is_none_or(|t| a.agent_type == t))
        .filter(|a| filter.pane.is_none_or(|p| a.pane == p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(bead_id: &str, agent_type: &str, pane: usize, status: AssignmentStatus) -> Assignment {
        Assignment {
            bead_id: bead_id.to_string(),
            bead_title: "title".to_string(),
            agent_type: agent_type.to_string(),
            pane,
            status,
            assigned_at: "2026-01-01T00:00:00Z".to_string(),
            file_reservations: Vec::new(),
        }
    }

    #[test]
    fn test_filter_on_empty_constraints_returns_all_in_order() {
        let assignments = vec![
            assignment("b1", "claude", 1, AssignmentStatus::Assigned),
            assignment("b2", "codex", 2, AssignmentStatus::Working),
        ];
        let result = filter_assignments(&assignments, &AssignmentFilter::default());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].bead_id, "b1");
        assert_eq!(result[1].bead_id, "b2");
    }

    #[test]
    fn test_filter_by_status_and_pane() {
        let assignments = vec![
            assignment("b1", "claude", 1, AssignmentStatus::Assigned),
            assignment("b2", "claude", 2, AssignmentStatus::Assigned),
        ];
        let filter = AssignmentFilter {
            status: Some(AssignmentStatus::Assigned),
            agent_type: None,
            pane: Some(2),
        };
        let result = filter_assignments(&assignments, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bead_id, "b2");
    }

    #[test]
    fn test_filter_on_empty_list_does_not_panic() {
        let assignments: Vec<Assignment> = Vec::new();
        let result = filter_assignments(&assignments, &AssignmentFilter::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_clear_summary_tallies_released_files() {
        let results = vec![
            ClearResult {
                bead_id: "b1".to_string(),
                outcome: ClearOutcome::Cleared {
                    files_released: vec!["a.rs".to_string(), "b.rs".to_string()],
                },
            },
            ClearResult {
                bead_id: "b2".to_string(),
                outcome: ClearOutcome::NotAssigned,
            },
        ];
        let summary = ClearSummary::tally(&results);
        assert_eq!(summary.cleared, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reservations_released, 2);
    }
}
