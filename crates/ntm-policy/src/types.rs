use serde::{Deserialize, Serialize};

/// On-disk rule shape (spec.md §6 "Policy file"): `{pattern, reason, slb?}`.
/// Kept distinct from the compiled, regex-backed rule used by `Check` so
/// that `show`/`edit`/`validate` round-trip the raw document exactly,
/// including rule order, without re-serializing a compiled `Regex`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    pub pattern: String,
    pub reason: String,
    #[serde(default)]
    pub slb: bool,
}

/// `force_release` automation setting (spec.md §6, §4.5 validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceRelease {
    #[default]
    Never,
    Approval,
    Auto,
}

/// `automation` block of the policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub auto_commit: bool,
    pub auto_push: bool,
    pub force_release: ForceRelease,
}

fn default_version() -> u32 {
    1
}

/// The on-disk policy document (spec.md §6: "YAML with top-level keys
/// `version`, `automation`, and lists `allowed`, `blocked`,
/// `approval_required`"). Serialized as TOML in this implementation — see
/// DESIGN.md for why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub automation: AutomationConfig,
    pub allowed: Vec<RawRule>,
    pub blocked: Vec<RawRule>,
    pub approval_required: Vec<RawRule>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            automation: AutomationConfig::default(),
            allowed: Vec::new(),
            blocked: Vec::new(),
            approval_required: Vec::new(),
        }
    }
}

impl PolicyDocument {
    /// A conservative built-in rule set, merged under any on-disk file by
    /// `LoadOrDefault` (on-disk rules are appended after these, so an
    /// operator can add exceptions without editing the built-ins).
    pub fn built_in() -> Self {
        Self {
            version: default_version(),
            automation: AutomationConfig::default(),
            allowed: vec![RawRule {
                pattern: r"^git\s+push\s+.*--force-with-lease(\s|$)".to_string(),
                reason: "force-with-lease checks the remote ref before overwriting".to_string(),
                slb: false,
            }],
            blocked: vec![
                RawRule {
                    pattern: r"^rm\s+-rf\s+/(\s|$)".to_string(),
                    reason: "refuses to remove the filesystem root".to_string(),
                    slb: false,
                },
                RawRule {
                    pattern: r"^git\s+push\s+.*--force(\s|$)".to_string(),
                    reason: "unconditional force-push can discard remote history".to_string(),
                    slb: false,
                },
            ],
            approval_required: vec![RawRule {
                pattern: r"^git\s+reset\s+--hard(\s|$)".to_string(),
                reason: "discards uncommitted local changes".to_string(),
                slb: true,
            }],
        }
    }
}

/// Action a matching rule (or the absence of one) resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Block,
    Approve,
}

/// Result of `Check(command)` — the matching rule, flattened for callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMatch {
    pub pattern: String,
    pub action: Action,
    pub reason: String,
    pub slb: bool,
}

/// `Stats()` — rule-list sizes, not invocation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStats {
    pub allowed: usize,
    pub blocked: usize,
    pub approval_required: usize,
}

/// An append-only blocked-command log record (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub command: String,
    pub reason: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version_is_one() {
        let doc = PolicyDocument::default();
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let doc: PolicyDocument = toml::from_str("").unwrap();
        assert_eq!(doc.version, 1);
        assert!(doc.allowed.is_empty());
        assert_eq!(doc.automation.force_release, ForceRelease::Never);
    }

    #[test]
    fn test_force_release_round_trips() {
        let doc: PolicyDocument = toml::from_str(
            r#"
[automation]
force_release = "approval"
"#,
        )
        .unwrap();
        assert_eq!(doc.automation.force_release, ForceRelease::Approval);
    }

    #[test]
    fn test_invalid_force_release_fails_to_parse() {
        let result: Result<PolicyDocument, _> = toml::from_str(
            r#"
[automation]
force_release = "sometimes"
"#,
        );
        assert!(result.is_err());
    }
}
