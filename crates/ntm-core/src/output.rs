//! The top-level JSON envelope (§7) every CLI command writes when
//! `--json` is set, and the human-readable mirror used otherwise.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Structured error detail attached to a failed [`Envelope`].
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// `{command, subcommand?, session?, timestamp, success, data?, warnings[],
/// error?{code, message, details?}}` from spec.md §7.
///
/// Human output mirrors this with colored icons (see `ntm::color`) but must
/// remain parseable as plain ASCII once ANSI escapes are stripped — callers
/// building the human line should derive it from the same fields rather
/// than inventing separate text.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(command: impl Into<String>, data: T, now: DateTime<Utc>) -> Self {
        Self {
            command: command.into(),
            subcommand: None,
            session: None,
            timestamp: now,
            success: true,
            data: Some(data),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn failure(
        command: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            command: command.into(),
            subcommand: None,
            session: None,
            timestamp: now,
            success: false,
            data: None,
            warnings: Vec::new(),
            error: Some(EnvelopeError {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
        }
    }

    pub fn with_subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.subcommand = Some(subcommand.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":{{"code":"ENVELOPE_SERIALIZE_FAILED","message":"{e}"}}}}"#)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error() {
        let env = Envelope::success("spawn", serde_json::json!({"ok": true}), Utc::now());
        let json = env.to_json();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"success\": true"));
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let env: Envelope<()> = Envelope::failure("spawn", "SESSION_EXISTS", "already there", Utc::now());
        let json = env.to_json();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("SESSION_EXISTS"));
    }

    #[test]
    fn test_builder_chain() {
        let env = Envelope::success("assign", serde_json::json!(1), Utc::now())
            .with_subcommand("clear")
            .with_session("lt-1")
            .with_warnings(vec!["mail registration failed".into()]);
        assert_eq!(env.subcommand.as_deref(), Some("clear"));
        assert_eq!(env.session.as_deref(), Some("lt-1"));
        assert_eq!(env.warnings.len(), 1);
    }
}
