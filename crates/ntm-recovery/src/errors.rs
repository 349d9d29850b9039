use ntm_core::NtmError;

/// Errors from building a recovery context (spec.md §4.4).
///
/// Per-source failures never surface here — they're captured as
/// [`crate::types::Diagnostic`] entries instead (graceful degradation).
/// This type exists for the rarer case of a malformed checkpoint file on
/// disk, which *is* a hard failure.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("failed to read checkpoint file '{path}': {source}")]
    CheckpointReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl NtmError for RecoveryError {
    fn error_code(&self) -> &'static str {
        match self {
            RecoveryError::CheckpointReadFailed { .. } => "IO_ERROR",
        }
    }
}
