//! Recovery-context data model (spec.md §3 "RecoveryContext", §4.4).

use ntm_core::collaborators::{Bead, FileReservation, InboxMessage, MemoryNote};
use serde::{Deserialize, Serialize};

/// A diagnostic attached when one or more sources errored out. Never fails
/// the builder by itself — see [`crate::builder::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn partial_recovery(source: &str, message: impl Into<String>) -> Self {
        Self {
            code: "PARTIAL_RECOVERY".to_string(),
            message: format!("{source}: {}", message.into()),
        }
    }
}

/// The assembled, possibly-truncated recovery context for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryContext {
    pub checkpoint: Option<String>,
    pub in_progress: Vec<Bead>,
    pub completed: Vec<Bead>,
    pub blocked: Vec<Bead>,
    pub messages: Vec<InboxMessage>,
    pub file_reservations: Vec<FileReservation>,
    pub rules: Vec<MemoryNote>,
    pub anti_patterns: Vec<MemoryNote>,
    pub diagnostics: Vec<Diagnostic>,
    /// Rendered markdown prompt. Empty when no section had meaningful
    /// content (spec.md §4.4 step 6).
    pub prompt: String,
    pub estimated_tokens: u64,
}

impl RecoveryContext {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_empty()
    }
}
