use ntm_core::NtmError;

/// Errors from the Assignment Engine (spec.md §4.3, §7).
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("no non-user panes are ready for assignment")]
    NoReadyPanes,

    #[error("timed out waiting for panes to become ready")]
    ReadyTimeout,

    #[error("'--clear' and '--clear-pane' are mutually exclusive")]
    ConflictingClearFlags,

    #[error(transparent)]
    Orchestrator(#[from] ntm_orchestrator::OrchestratorError),

    #[error(transparent)]
    Collaborator(#[from] ntm_core::collaborators::CollaboratorError),
}

impl NtmError for AssignError {
    fn error_code(&self) -> &'static str {
        match self {
            AssignError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AssignError::NoReadyPanes => "NO_READY_PANES",
            AssignError::ReadyTimeout => "READY_TIMEOUT",
            AssignError::ConflictingClearFlags => "CONFLICTING_FLAGS",
            AssignError::Orchestrator(e) => e.error_code(),
            AssignError::Collaborator(_) => "COLLABORATOR_UNAVAILABLE",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            AssignError::SessionNotFound(_)
                | AssignError::NoReadyPanes
                | AssignError::ReadyTimeout
                | AssignError::ConflictingClearFlags
        )
    }
}
