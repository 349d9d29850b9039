//! External-collaborator seams (spec.md §1, §4.3, §4.4).
//!
//! The triage tool, mail/messaging service, and procedural-memory service
//! are genuinely external systems this workspace does not implement (per
//! §1's Non-goals). Each gets a narrow trait so the Assignment Engine and
//! Recovery-Context Builder can be built and tested against a `NullClient`
//! that degrades gracefully — "behave as if every source is absent" is the
//! correct default when nothing is configured (spec.md §4.4 "Graceful
//! degradation").

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One ranked work item as reported by the external triage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub bead_id: String,
    pub title: String,
    pub agent_type: Option<String>,
    pub dependencies: Vec<String>,
}

/// An inbox message as reported by the external mail collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub from: String,
    pub body: String,
    pub sent_at: String,
}

/// A claim that a file is being edited by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReservation {
    pub path: String,
    pub bead_id: String,
}

/// A procedural rule or anti-pattern surfaced by the memory collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNote {
    pub title: String,
    pub body: String,
}

/// A completed/in-progress/blocked work item, as reported by the triage
/// collaborator for recovery-context purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bead {
    pub id: String,
    pub title: String,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
#[error("collaborator unavailable: {0}")]
pub struct CollaboratorError(pub String);

/// Ranked work items for the Assignment Engine (spec.md §4.3 step 3).
#[async_trait]
pub trait TriageClient: Send + Sync {
    async fn candidates(&self, session: &str) -> Result<Vec<WorkItem>, CollaboratorError>;
}

/// Inbox messages and file reservations for Recovery-Context and the
/// Assignment Engine's `Bind` step (spec.md §4.3 step 5, §4.4 step 2).
#[async_trait]
pub trait MailClient: Send + Sync {
    async fn recent_messages(&self, session: &str, limit: usize) -> Result<Vec<InboxMessage>, CollaboratorError>;
    async fn file_reservations(&self, session: &str) -> Result<Vec<FileReservation>, CollaboratorError>;
    async fn reserve_files(&self, bead_id: &str, paths: &[String]) -> Result<(), CollaboratorError>;
    async fn release_files(&self, bead_id: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// Procedural rules and anti-patterns for Recovery-Context (spec.md §4.4
/// step 2).
#[async_trait]
pub trait MemoryClient: Send + Sync {
    async fn rules(&self, project: &str, limit: usize) -> Result<Vec<MemoryNote>, CollaboratorError>;
    async fn anti_patterns(&self, project: &str, limit: usize) -> Result<Vec<MemoryNote>, CollaboratorError>;
}

/// Beads grouped by status, plus the cached 1h-TTL scan result mentioned in
/// spec.md §6's on-disk layout (`scan_cache.json`), feeding readiness
/// heuristics opportunistically.
#[async_trait]
pub trait ScanClient: Send + Sync {
    async fn beads_by_status(&self, session: &str, status: &str, limit: usize) -> Result<Vec<Bead>, CollaboratorError>;
}

/// The default-wired implementation of every collaborator trait when no
/// real endpoint is configured: every call succeeds instantly with an
/// empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClient;

#[async_trait]
impl TriageClient for NullClient {
    async fn candidates(&self, _session: &str) -> Result<Vec<WorkItem>, CollaboratorError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl MailClient for NullClient {
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
        Ok(Vec::new())
    }
}

#[async_trait]
impl MemoryClient for NullClient {
    async fn rules(&self, _project: &str, _limit: usize) -> Result<Vec<MemoryNote>, CollaboratorError> {
        Ok(Vec::new())
    }

    async fn anti_patterns(&self, _project: &str, _limit: usize) -> Result<Vec<MemoryNote>, CollaboratorError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ScanClient for NullClient {
    async fn beads_by_status(&self, _session: &str, _status: &str, _limit: usize) -> Result<Vec<Bead>, CollaboratorError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_client_degrades_to_empty() {
        let client = NullClient;
        assert!(client.candidates("lt-1").await.unwrap().is_empty());
        assert!(client.recent_messages("lt-1", 10).await.unwrap().is_empty());
        assert!(client.rules("proj", 10).await.unwrap().is_empty());
        assert!(client.beads_by_status("lt-1", "completed", 10).await.unwrap().is_empty());
    }
}
