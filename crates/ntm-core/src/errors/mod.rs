use std::error::Error;

/// Base trait for all application errors.
///
/// Typed error enums throughout the workspace implement this so the CLI can
/// categorize failures into the exit-code taxonomy without downcasting.
pub trait NtmError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling (JSON envelope `error.code`).
    fn error_code(&self) -> &'static str;

    /// Whether this error stems from user input/state rather than an
    /// internal fault. User errors are logged at WARN, not ERROR.
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for boxed, dynamically-dispatched application errors.
pub type NtmResult<T> = Result<T, Box<dyn NtmError>>;
