//! `AgentSpec` — the flattened (type, ordinal, variant) triple described in
//! spec.md §3, plus the deterministic alias -> canonical-model resolver.
//!
//! Modeled as a plain value type per spec.md §9 ("dynamic agent plugins...
//! a value type, not a vtable"): behavior genuinely doesn't differ per
//! agent kind here, only the command template and default variant do, so
//! there is no trait object / registry — just data plus
//! [`ntm_config::NtmConfig::get_agent_command`] and
//! [`ntm_config::NtmConfig::resolve_model_alias`].

use serde::{Deserialize, Serialize};

pub use ntm_protocol::AgentKind;

/// One agent to be launched into a pane, flattened from CLI flags/config
/// before spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub kind: AgentKind,
    /// 1-based ordinal among agents of the same kind in this batch
    /// (`cc-1`, `cc-2`, ...).
    pub ordinal: u32,
    /// User-facing alias (model alias or persona/profile name). Defaults to
    /// the kind's name when the user didn't pass one.
    pub variant: String,
}

impl AgentSpec {
    pub fn new(kind: AgentKind, ordinal: u32, variant: impl Into<String>) -> Self {
        Self {
            kind,
            ordinal,
            variant: variant.into(),
        }
    }

    /// The canonical pane title: `{session}__{type}_{ordinal}[_{variant}]`.
    ///
    /// The variant suffix is omitted when it is equal to the kind's bare
    /// name (the common case of "no model override requested").
    pub fn pane_title(&self, session: &str) -> String {
        let kind = self.kind.to_string();
        if self.variant == kind || self.variant.is_empty() {
            format!("{session}__{kind}_{}", self.ordinal)
        } else {
            format!("{session}__{kind}_{}_{}", self.ordinal, self.variant)
        }
    }

    /// Resolve this spec's variant to a canonical model string via the
    /// config's `[models]` alias table, falling back to the variant itself
    /// verbatim when it has no table entry.
    pub fn resolve_model<'a>(&'a self, config: &'a ntm_config::NtmConfig) -> &'a str {
        config
            .resolve_model_alias(&self.variant)
            .unwrap_or(&self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_title_without_variant_override() {
        let spec = AgentSpec::new(AgentKind::Claude, 1, "claude");
        assert_eq!(spec.pane_title("lt-1"), "lt-1__claude_1");
    }

    #[test]
    fn test_pane_title_with_variant_override() {
        let spec = AgentSpec::new(AgentKind::Claude, 2, "opus");
        assert_eq!(spec.pane_title("lt-1"), "lt-1__claude_2_opus");
    }

    #[test]
    fn test_resolve_model_falls_back_to_variant() {
        let config = ntm_config::NtmConfig::default();
        let spec = AgentSpec::new(AgentKind::Claude, 1, "sonnet-4.7");
        assert_eq!(spec.resolve_model(&config), "sonnet-4.7");
    }

    #[test]
    fn test_resolve_model_uses_alias_table() {
        let mut config = ntm_config::NtmConfig::default();
        config
            .models
            .insert("fast".to_string(), "claude-haiku-4".to_string());
        let spec = AgentSpec::new(AgentKind::Claude, 1, "fast");
        assert_eq!(spec.resolve_model(&config), "claude-haiku-4");
    }

    #[test]
    fn test_plugin_kind_pane_title() {
        let spec = AgentSpec::new(
            AgentKind::Plugin {
                name: "aider".to_string(),
            },
            1,
            "plugin:aider",
        );
        assert_eq!(spec.pane_title("lt-1"), "lt-1__plugin:aider_1");
    }
}
