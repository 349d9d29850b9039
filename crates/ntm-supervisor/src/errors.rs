use ntm_core::NtmError;

/// Errors raised by the Supervisor's public operations (spec.md §4.2, §7).
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("daemon '{name}' not found")]
    NotFound { name: String },

    #[error("daemon '{name}' is already in use (pid {pid}, command '{command}')")]
    InUse {
        name: String,
        pid: u32,
        command: String,
    },

    #[error("failed to acquire a port: {message}")]
    PortAcquisitionFailed { message: String },

    #[error("failed to spawn daemon '{name}': {message}")]
    SpawnFailed { name: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pid file error: {0}")]
    PidFile(#[from] ntm_core::process::ProcessError),
}

impl NtmError for SupervisorError {
    fn error_code(&self) -> &'static str {
        match self {
            SupervisorError::NotFound { .. } => "NOT_FOUND",
            SupervisorError::InUse { .. } => "IN_USE",
            SupervisorError::PortAcquisitionFailed { .. } => "PORT_ACQUISITION_FAILED",
            SupervisorError::SpawnFailed { .. } => "SPAWN_FAILED",
            SupervisorError::Io(_) => "IO_ERROR",
            SupervisorError::PidFile(_) => "IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SupervisorError::NotFound { .. } | SupervisorError::InUse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_message() {
        let err = SupervisorError::InUse {
            name: "mail".into(),
            pid: 123,
            command: "mail-broker".into(),
        };
        assert!(err.to_string().contains("123"));
        assert_eq!(err.error_code(), "IN_USE");
        assert!(err.is_user_error());
    }
}
