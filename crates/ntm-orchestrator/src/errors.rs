use ntm_core::NtmError;

/// Errors from the `TerminalAdapter` seam (spec.md SPEC_FULL.md §4
/// "Supplemented: TerminalAdapter").
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),
    #[error("pane '{0}' not found in session '{1}'")]
    PaneNotFound(String, String),
    #[error("multiplexer command failed: {0}")]
    CommandFailed(String),
    #[error("terminal multiplexer not installed")]
    NotInstalled,
}

impl NtmError for AdapterError {
    fn error_code(&self) -> &'static str {
        match self {
            AdapterError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AdapterError::PaneNotFound(_, _) => "PANE_NOT_FOUND",
            AdapterError::CommandFailed(_) => "ADAPTER_COMMAND_FAILED",
            AdapterError::NotInstalled => "ADAPTER_NOT_INSTALLED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            AdapterError::SessionNotFound(_) | AdapterError::PaneNotFound(_, _)
        )
    }
}

/// Errors from the Session/Pane Orchestrator (spec.md §4.1, §7).
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid session name '{0}'")]
    InvalidName(String),
    #[error("session '{0}' already exists")]
    SessionExists(String),
    #[error("session '{0}' not found")]
    SessionNotFound(String),
    #[error("operation cancelled before completion")]
    Cancelled,
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("no agent command configured: {0}")]
    NoAgentCommand(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize spawn state: {0}")]
    Serde(#[from] serde_json::Error),
}

impl NtmError for OrchestratorError {
    fn error_code(&self) -> &'static str {
        match self {
            OrchestratorError::InvalidName(_) => "INVALID_NAME",
            OrchestratorError::SessionExists(_) => "SESSION_EXISTS",
            OrchestratorError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            OrchestratorError::Cancelled => "CANCELLED",
            OrchestratorError::Adapter(e) => e.error_code(),
            OrchestratorError::NoAgentCommand(_) => "NO_AGENT_COMMAND",
            OrchestratorError::Io(_) => "IO_ERROR",
            OrchestratorError::Serde(_) => "IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            OrchestratorError::InvalidName(_)
                | OrchestratorError::SessionExists(_)
                | OrchestratorError::SessionNotFound(_)
        )
    }
}
