//! Configuration value types.
//!
//! Fields that feed hierarchy merging are `Option<T>`; each such type
//! carries accessor methods with the same name as the field (no `get_`
//! prefix) that resolve `None` to the built-in default from
//! [`crate::defaults`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent_data;
use crate::defaults;

/// Global agent settings (`[agent]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub default: String,
    pub startup_command: Option<String>,
    pub flags: Option<String>,
    /// Agent kind name (`"claude"`, `"codex"`, ...) treated as the
    /// reviewer for the Assignment Engine's `quality` strategy. `None`
    /// means no agent is preferred.
    pub reviewer_agent_type: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default: agent_data::default_agent_name().to_string(),
            startup_command: None,
            flags: None,
            reviewer_agent_type: None,
        }
    }
}

/// Per-agent override (`[agents.<name>]` sections).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSettings {
    pub startup_command: Option<String>,
    pub flags: Option<String>,
}

/// Staggered prompt-delivery defaults (`[stagger]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaggerConfig {
    /// Interval `S` between successive agents' prompt delivery, in seconds.
    /// Used when `spawn --stagger` is passed with no explicit duration.
    pub default_interval_secs: Option<u64>,
}

impl StaggerConfig {
    pub fn default_interval_secs(&self) -> u64 {
        self.default_interval_secs
            .unwrap_or_else(defaults::stagger_interval_secs)
    }

    pub fn merge(base: &Self, over: &Self) -> Self {
        Self {
            default_interval_secs: over.default_interval_secs.or(base.default_interval_secs),
        }
    }
}

/// Supervisor tuning knobs (`[supervisor]`), passed to
/// `Supervisor::new(config)` as `health_interval`, `max_restarts`, and
/// `restart_backoff_max`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub health_interval_secs: Option<u64>,
    pub max_restarts: Option<u32>,
    pub initial_restart_delay_secs: Option<u64>,
    pub restart_backoff_max_secs: Option<u64>,
    /// Whether `ensure_supervisor_running()` may spawn `ntm-supervisord`
    /// on demand. Disabling this means every command that needs the
    /// supervisor fails with a clear "start it yourself" error instead.
    pub auto_start: Option<bool>,
}

impl SupervisorConfig {
    pub fn health_interval_secs(&self) -> u64 {
        self.health_interval_secs
            .unwrap_or_else(defaults::health_interval_secs)
    }

    pub fn max_restarts(&self) -> u32 {
        self.max_restarts.unwrap_or_else(defaults::max_restarts)
    }

    pub fn initial_restart_delay_secs(&self) -> u64 {
        self.initial_restart_delay_secs
            .unwrap_or_else(defaults::initial_restart_delay_secs)
    }

    pub fn restart_backoff_max_secs(&self) -> u64 {
        self.restart_backoff_max_secs
            .unwrap_or_else(defaults::restart_backoff_max_secs)
    }

    pub fn auto_start(&self) -> bool {
        self.auto_start.unwrap_or(true)
    }

    pub fn merge(base: &Self, over: &Self) -> Self {
        Self {
            health_interval_secs: over.health_interval_secs.or(base.health_interval_secs),
            max_restarts: over.max_restarts.or(base.max_restarts),
            initial_restart_delay_secs: over
                .initial_restart_delay_secs
                .or(base.initial_restart_delay_secs),
            restart_backoff_max_secs: over
                .restart_backoff_max_secs
                .or(base.restart_backoff_max_secs),
            auto_start: over.auto_start.or(base.auto_start),
        }
    }
}

/// Assignment-engine readiness polling (`[readiness]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadinessConfig {
    pub poll_interval_secs: Option<u64>,
    pub ready_timeout_secs: Option<u64>,
    /// Overridable idle-marker list. `None` uses the built-in defaults;
    /// `Some(vec![])` is a deliberate "match nothing" override.
    pub idle_markers: Option<Vec<String>>,
}

impl ReadinessConfig {
    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
            .unwrap_or_else(defaults::readiness_poll_interval_secs)
    }

    pub fn ready_timeout_secs(&self) -> u64 {
        self.ready_timeout_secs
            .unwrap_or_else(defaults::ready_timeout_secs)
    }

    pub fn idle_markers(&self) -> Vec<String> {
        self.idle_markers.clone().unwrap_or_else(defaults::idle_markers)
    }

    pub fn merge(base: &Self, over: &Self) -> Self {
        Self {
            poll_interval_secs: over.poll_interval_secs.or(base.poll_interval_secs),
            ready_timeout_secs: over.ready_timeout_secs.or(base.ready_timeout_secs),
            idle_markers: over.idle_markers.clone().or_else(|| base.idle_markers.clone()),
        }
    }
}

/// Recovery-Context Builder tuning (`[recovery]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryConfig {
    pub enabled: Option<bool>,
    pub include_beads: Option<bool>,
    pub include_mail: Option<bool>,
    pub include_memories: Option<bool>,
    pub max_tokens: Option<u64>,
    pub stale_hours: Option<u64>,
}

impl RecoveryConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn include_beads(&self) -> bool {
        self.include_beads.unwrap_or(true)
    }

    pub fn include_mail(&self) -> bool {
        self.include_mail.unwrap_or(true)
    }

    pub fn include_memories(&self) -> bool {
        self.include_memories.unwrap_or(true)
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens.unwrap_or_else(defaults::recovery_max_tokens)
    }

    pub fn stale_hours(&self) -> u64 {
        self.stale_hours.unwrap_or_else(defaults::recovery_stale_hours)
    }

    pub fn merge(base: &Self, over: &Self) -> Self {
        Self {
            enabled: over.enabled.or(base.enabled),
            include_beads: over.include_beads.or(base.include_beads),
            include_mail: over.include_mail.or(base.include_mail),
            include_memories: over.include_memories.or(base.include_memories),
            max_tokens: over.max_tokens.or(base.max_tokens),
            stale_hours: over.stale_hours.or(base.stale_hours),
        }
    }
}

/// Command-Safety Policy Engine file location (`[policy]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Override for the policy document path. `None` resolves to
    /// `NtmHome::policy_file()`.
    pub path: Option<String>,
}

impl PolicyConfig {
    pub fn merge(base: &Self, over: &Self) -> Self {
        Self {
            path: over.path.clone().or_else(|| base.path.clone()),
        }
    }
}

/// Root configuration type, merged from `~/.ntm/config.toml` then
/// `<project>/.ntm/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NtmConfig {
    pub agent: AgentConfig,
    pub agents: HashMap<String, AgentSettings>,
    /// Model alias table: user-facing variant name → canonical model string.
    pub models: HashMap<String, String>,
    pub stagger: StaggerConfig,
    pub supervisor: SupervisorConfig,
    pub readiness: ReadinessConfig,
    pub recovery: RecoveryConfig,
    pub policy: PolicyConfig,
}
