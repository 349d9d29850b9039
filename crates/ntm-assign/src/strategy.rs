//! Dispatch strategies (spec.md §4.3 step 4): "plain dispatch in this
//! spec; strategies differ in tie-breaking only".

use std::collections::HashSet;
use std::time::Duration;

use ntm_core::collaborators::WorkItem;

use crate::types::Strategy;

/// One candidate pane an item can be dispatched to.
#[derive(Debug, Clone)]
pub struct AgentSlot {
    pub pane: usize,
    pub agent_type: String,
    /// How long this pane has been continuously idle, from
    /// [`crate::readiness::wait_for_ready`]. Zero when unknown.
    pub idle_for: Duration,
}

/// Select `(work item, pane)` pairs to bind, in assignment order, honoring
/// `limit` (0 = unlimited) and stopping when either pool is exhausted.
pub fn select(
    strategy: Strategy,
    candidates: &[WorkItem],
    agents: &[AgentSlot],
    completed_ids: &HashSet<String>,
    limit: usize,
) -> Vec<(WorkItem, AgentSlot)> {
    if agents.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let ordered_agents = order_agents(strategy, agents);
    let mut selections = Vec::new();
    let mut agent_cursor = 0usize;

    for item in candidates {
        if limit != 0 && selections.len() >= limit {
            break;
        }

        if strategy == Strategy::Dependency && !dependencies_met(item, completed_ids) {
            continue;
        }

        let slot = pick_slot(strategy, item, &ordered_agents, &mut agent_cursor);
        let Some(slot) = slot else { break };
        selections.push((item.clone(), slot));
    }

    selections
}

fn dependencies_met(item: &WorkItem, completed_ids: &HashSet<String>) -> bool {
    item.dependencies.iter().all(|dep| completed_ids.contains(dep))
}

/// Pre-sort agents once per call per the strategy's tie-break rule; the
/// selection loop then walks this order round-robin.
fn order_agents(strategy: Strategy, agents: &[AgentSlot]) -> Vec<AgentSlot> {
    let mut ordered = agents.to_vec();
    match strategy {
        Strategy::Speed => ordered.sort_by(|a, b| b.idle_for.cmp(&a.idle_for)),
        Strategy::Balanced | Strategy::Quality | Strategy::Dependency | Strategy::RoundRobin => {
            ordered.sort_by_key(|a| a.pane);
        }
    }
    ordered
}

fn pick_slot(
    strategy: Strategy,
    item: &WorkItem,
    ordered_agents: &[AgentSlot],
    agent_cursor: &mut usize,
) -> Option<AgentSlot> {
    match strategy {
        Strategy::Quality => {
            let reviewer = ordered_agents
                .iter()
                .find(|a| Some(a.agent_type.as_str()) == item.agent_type.as_deref());
            reviewer.cloned().or_else(|| ordered_agents.first().cloned())
        }
        Strategy::Balanced | Strategy::Speed | Strategy::Dependency | Strategy::RoundRobin => {
            let slot = ordered_agents.get(*agent_cursor % ordered_agents.len())?.clone();
            *agent_cursor += 1;
            Some(slot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, agent_type: Option<&str>, deps: &[&str]) -> WorkItem {
        WorkItem {
            bead_id: id.to_string(),
            title: format!("task {id}"),
            agent_type: agent_type.map(str::to_string),
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn slot(pane: usize, agent_type: &str, idle_secs: u64) -> AgentSlot {
        AgentSlot {
            pane,
            agent_type: agent_type.to_string(),
            idle_for: Duration::from_secs(idle_secs),
        }
    }

    #[test]
    fn test_balanced_round_robins_across_agents() {
        let candidates = vec![item("b1", None, &[]), item("b2", None, &[]), item("b3", None, &[])];
        let agents = vec![slot(1, "claude", 0), slot(2, "codex", 0)];
        let result = select(Strategy::Balanced, &candidates, &agents, &HashSet::new(), 0);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].1.pane, 1);
        assert_eq!(result[1].1.pane, 2);
        assert_eq!(result[2].1.pane, 1);
    }

    #[test]
    fn test_speed_prefers_longest_idle_agent_first() {
        let candidates = vec![item("b1", None, &[])];
        let agents = vec![slot(1, "claude", 5), slot(2, "codex", 50)];
        let result = select(Strategy::Speed, &candidates, &agents, &HashSet::new(), 0);
        assert_eq!(result[0].1.pane, 2);
    }

    #[test]
    fn test_quality_prefers_reviewer_agent_type() {
        let candidates = vec![item("b1", Some("codex"), &[])];
        let agents = vec![slot(1, "claude", 0), slot(2, "codex", 0)];
        let result = select(Strategy::Quality, &candidates, &agents, &HashSet::new(), 0);
        assert_eq!(result[0].1.agent_type, "codex");
    }

    #[test]
    fn test_dependency_skips_item_with_unmet_prerequisite() {
        let candidates = vec![item("b1", None, &["b0"]), item("b2", None, &[])];
        let agents = vec![slot(1, "claude", 0)];
        let result = select(Strategy::Dependency, &candidates, &agents, &HashSet::new(), 0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0.bead_id, "b2");
    }

    #[test]
    fn test_dependency_assigns_item_once_prerequisite_completed() {
        let candidates = vec![item("b1", None, &["b0"])];
        let agents = vec![slot(1, "claude", 0)];
        let mut completed = HashSet::new();
        completed.insert("b0".to_string());
        let result = select(Strategy::Dependency, &candidates, &agents, &completed, 0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_limit_stops_after_n_assignments() {
        let candidates = vec![item("b1", None, &[]), item("b2", None, &[]), item("b3", None, &[])];
        let agents = vec![slot(1, "claude", 0), slot(2, "codex", 0)];
        let result = select(Strategy::Balanced, &candidates, &agents, &HashSet::new(), 2);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_empty_agents_returns_no_selections() {
        let candidates = vec![item("b1", None, &[])];
        let result = select(Strategy::Balanced, &candidates, &[], &HashSet::new(), 0);
        assert!(result.is_empty());
    }
}
