//! Rule-ordered command classification (spec.md §4.5).

use std::path::Path;

use regex::Regex;
use tracing::warn;

use crate::errors::PolicyError;
use crate::types::{Action, PolicyDocument, PolicyMatch, PolicyStats, RawRule};

struct CompiledRule {
    pattern: String,
    regex: Regex,
    reason: String,
    slb: bool,
}

impl CompiledRule {
    fn compile(list: &str, index: usize, raw: &RawRule) -> Result<Self, PolicyError> {
        let regex = Regex::new(&raw.pattern).map_err(|e| PolicyError::InvalidPattern {
            list: list.to_string(),
            index,
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: raw.pattern.clone(),
            regex,
            reason: raw.reason.clone(),
            slb: raw.slb,
        })
    }

    fn to_match(&self, action: Action) -> PolicyMatch {
        PolicyMatch {
            pattern: self.pattern.clone(),
            action,
            reason: self.reason.clone(),
            slb: self.slb,
        }
    }
}

/// A compiled, checkable policy. Holds the raw [`PolicyDocument`] too, so
/// `show`/`edit`/`validate` can round-trip the on-disk shape exactly.
pub struct Policy {
    document: PolicyDocument,
    allowed: Vec<CompiledRule>,
    blocked: Vec<CompiledRule>,
    approval_required: Vec<CompiledRule>,
}

impl Policy {
    /// Compile a document, failing on the first rule whose pattern doesn't
    /// compile as a regex (spec.md §4.5 "Validation").
    pub fn compile(document: PolicyDocument) -> Result<Self, PolicyError> {
        if document.version == 0 {
            warn!(event = "policy.version_missing_defaulted", defaulted_to = 1);
        }

        let allowed = compile_list("allowed", &document.allowed)?;
        let blocked = compile_list("blocked", &document.blocked)?;
        let approval_required = compile_list("approval_required", &document.approval_required)?;

        Ok(Self {
            document,
            allowed,
            blocked,
            approval_required,
        })
    }

    /// `LoadOrDefault()` — merge the built-in default with an optional
    /// on-disk file. On-disk rules are appended after the built-ins within
    /// each list, so the built-ins still apply but an operator's own rules
    /// take effect too (evaluation order is still declaration order, so a
    /// built-in `allowed` exception is still checked before any on-disk
    /// `blocked` rule).
    pub fn load_or_default(path: &Path) -> Result<Self, PolicyError> {
        let built_in = PolicyDocument::built_in();

        if !path.exists() {
            return Self::compile(built_in);
        }

        let content = std::fs::read_to_string(path).map_err(|e| PolicyError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let on_disk: PolicyDocument = toml::from_str(&content).map_err(|e| PolicyError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let merged = PolicyDocument {
            version: on_disk.version,
            automation: on_disk.automation,
            allowed: merge_rules(built_in.allowed, on_disk.allowed),
            blocked: merge_rules(built_in.blocked, on_disk.blocked),
            approval_required: merge_rules(built_in.approval_required, on_disk.approval_required),
        };

        Self::compile(merged)
    }

    /// `Check(command)` — scan `allowed`, then `blocked`, then
    /// `approval_required`, in declaration order; first match wins.
    /// `None` means no rule matched (implicit allow).
    pub fn check(&self, command: &str) -> Option<PolicyMatch> {
        if let Some(rule) = self.allowed.iter().find(|r| r.regex.is_match(command)) {
            return Some(rule.to_match(Action::Allow));
        }
        if let Some(rule) = self.blocked.iter().find(|r| r.regex.is_match(command)) {
            return Some(rule.to_match(Action::Block));
        }
        if let Some(rule) = self.approval_required.iter().find(|r| r.regex.is_match(command)) {
            return Some(rule.to_match(Action::Approve));
        }
        None
    }

    /// Like `check`, but resolves the implicit-allow case into an explicit
    /// `PolicyMatch` for callers that want a single value in all cases
    /// (the `safety check` CLI surface).
    pub fn classify(&self, command: &str) -> PolicyMatch {
        self.check(command).unwrap_or_else(|| PolicyMatch {
            pattern: String::new(),
            action: Action::Allow,
            reason: "no matching rule (implicit allow)".to_string(),
            slb: false,
        })
    }

    pub fn stats(&self) -> PolicyStats {
        PolicyStats {
            allowed: self.allowed.len(),
            blocked: self.blocked.len(),
            approval_required: self.approval_required.len(),
        }
    }

    /// The raw document, for `show`/`edit`/`validate` round-tripping.
    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }
}

fn compile_list(list: &str, raws: &[RawRule]) -> Result<Vec<CompiledRule>, PolicyError> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| CompiledRule::compile(list, i, raw))
        .collect()
}

fn merge_rules(built_in: Vec<RawRule>, on_disk: Vec<RawRule>) -> Vec<RawRule> {
    let mut merged = built_in;
    merged.extend(on_disk);
    merged
}
