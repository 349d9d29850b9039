use std::path::PathBuf;

use crate::errors::NtmError;

/// Errors from process and PID-file primitives.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("invalid PID: {pid}")]
    InvalidPid { pid: u32 },

    #[error("PID file error at {path}: {message}")]
    PidFileError { path: PathBuf, message: String },

    #[error("failed to signal process {pid}: {message}")]
    SignalFailed { pid: u32, message: String },
}

impl NtmError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::InvalidPid { .. } => "INVALID_PID",
            ProcessError::PidFileError { .. } => "PID_FILE_ERROR",
            ProcessError::SignalFailed { .. } => "SIGNAL_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ProcessError::InvalidPid { .. })
    }
}
