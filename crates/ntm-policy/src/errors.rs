use ntm_core::NtmError;

/// Errors from loading, compiling, or appending to the policy engine's
/// state (spec.md §4.5, §7).
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file '{path}': {message}")]
    ParseFailed { path: String, message: String },

    #[error("rule #{index} in '{list}' has an invalid pattern: {message}")]
    InvalidPattern {
        list: String,
        index: usize,
        message: String,
    },

    #[error("failed to write policy file '{path}': {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append blocked-command log entry: {0}")]
    LogAppendFailed(std::io::Error),
}

impl NtmError for PolicyError {
    fn error_code(&self) -> &'static str {
        match self {
            PolicyError::ReadFailed { .. } => "IO_ERROR",
            PolicyError::ParseFailed { .. } => "MALFORMED_POLICY",
            PolicyError::InvalidPattern { .. } => "MALFORMED_POLICY",
            PolicyError::WriteFailed { .. } => "IO_ERROR",
            PolicyError::LogAppendFailed(_) => "IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            PolicyError::ParseFailed { .. } | PolicyError::InvalidPattern { .. }
        )
    }
}
