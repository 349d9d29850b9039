use crate::errors::NtmError;

/// Errors from supervisor auto-start operations.
#[derive(Debug, thiserror::Error)]
pub enum DaemonAutoStartError {
    #[error(
        "ntm-supervisord is not running. To fix this, either:\n  \
         - start it manually: ntm-supervisord\n  \
         - enable auto-start in config: [supervisor] auto_start = true"
    )]
    Disabled,

    #[error("failed to start ntm-supervisord: {message}")]
    SpawnFailed { message: String },

    #[error("ntm-supervisord auto-start timed out: {message}")]
    Timeout { message: String },

    #[error("could not locate the ntm-supervisord binary: {message}")]
    BinaryNotFound { message: String },
}

impl NtmError for DaemonAutoStartError {
    fn error_code(&self) -> &'static str {
        match self {
            DaemonAutoStartError::Disabled => "SUPERVISOR_AUTO_START_DISABLED",
            DaemonAutoStartError::SpawnFailed { .. } => "SUPERVISOR_SPAWN_FAILED",
            DaemonAutoStartError::Timeout { .. } => "SUPERVISOR_AUTO_START_TIMEOUT",
            DaemonAutoStartError::BinaryNotFound { .. } => "SUPERVISOR_BINARY_NOT_FOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, DaemonAutoStartError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DaemonAutoStartError::Disabled.error_code(),
            "SUPERVISOR_AUTO_START_DISABLED"
        );
        assert!(DaemonAutoStartError::Disabled.is_user_error());
        assert!(
            !DaemonAutoStartError::SpawnFailed {
                message: "x".into()
            }
            .is_user_error()
        );
    }
}
