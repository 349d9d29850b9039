//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override
//! earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.ntm/config.toml` (global user preferences)
//! 3. **Project config** - `<project>/.ntm/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by callers)

use std::fs;
use std::path::Path;

use crate::agent_data;
use crate::types::{
    AgentConfig, NtmConfig, PolicyConfig, ReadinessConfig, RecoveryConfig, StaggerConfig,
    SupervisorConfig,
};
use crate::validation::validate_config;

/// Check if an error is a "file not found" error.
fn is_file_not_found(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
        return io_err.kind() == std::io::ErrorKind::NotFound;
    }

    let err_str = e.to_string();
    err_str.contains("No such file or directory") || err_str.contains("cannot find the path")
}

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<NtmConfig, Box<dyn std::error::Error>> {
    let mut config = NtmConfig::default();

    match load_user_config() {
        Ok(user_config) => config = merge_configs(config, user_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with defaults
    }

    match load_project_config() {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with merged config
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load the user configuration from `~/.ntm/config.toml`.
fn load_user_config() -> Result<NtmConfig, Box<dyn std::error::Error>> {
    let home = ntm_paths::NtmHome::resolve().map_err(|e| e.to_string())?;
    load_config_file(&home.config_file())
}

/// Load the project configuration from `<project>/.ntm/config.toml`.
fn load_project_config() -> Result<NtmConfig, Box<dyn std::error::Error>> {
    let project_root = std::env::current_dir()?;
    load_config_file(&ntm_paths::ProjectPaths::for_project(&project_root).config_file())
}

/// Load a configuration file from the given path.
fn load_config_file(path: &Path) -> Result<NtmConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("'{}': {}", path.display(), e)))?;
    let config: NtmConfig = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
    Ok(config)
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// For optional fields, override values replace base values only if
/// present. For collections (`agents`, `models`), entries are merged with
/// the override taking precedence per key.
pub fn merge_configs(base: NtmConfig, override_config: NtmConfig) -> NtmConfig {
    NtmConfig {
        agent: AgentConfig {
            // We can't distinguish between explicit "claude" and default
            // "claude" here, so the override config's agent setting always wins.
            default: override_config.agent.default,
            startup_command: override_config
                .agent
                .startup_command
                .or(base.agent.startup_command),
            flags: override_config.agent.flags.or(base.agent.flags),
            reviewer_agent_type: override_config
                .agent
                .reviewer_agent_type
                .or(base.agent.reviewer_agent_type),
        },
        agents: {
            let mut merged = base.agents;
            for (key, value) in override_config.agents {
                merged.insert(key, value);
            }
            merged
        },
        models: {
            let mut merged = base.models;
            for (key, value) in override_config.models {
                merged.insert(key, value);
            }
            merged
        },
        stagger: StaggerConfig::merge(&base.stagger, &override_config.stagger),
        supervisor: SupervisorConfig::merge(&base.supervisor, &override_config.supervisor),
        readiness: ReadinessConfig::merge(&base.readiness, &override_config.readiness),
        recovery: RecoveryConfig::merge(&base.recovery, &override_config.recovery),
        policy: PolicyConfig::merge(&base.policy, &override_config.policy),
    }
}

/// Get the command to run for a specific agent.
///
/// Resolution order:
/// 1. Agent-specific settings from `[agents.<name>]`
/// 2. Global agent config from `[agent]`
/// 3. Built-in default command for a known agent kind
///
/// # Errors
///
/// Returns an error if no command can be determined — an unrecognized
/// (likely plugin) agent name with no configured `startup_command`.
pub fn get_agent_command(
    config: &NtmConfig,
    agent_name: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let (base_command, flags) = if let Some(agent_settings) = config.agents.get(agent_name) {
        let base = resolve_base_command(
            agent_settings.startup_command.as_deref(),
            config.agent.startup_command.as_deref(),
            agent_name,
        )?;
        (base, agent_settings.flags.as_deref())
    } else {
        let base = resolve_base_command(None, config.agent.startup_command.as_deref(), agent_name)?;
        (base, config.agent.flags.as_deref())
    };

    Ok(build_command(&base_command, flags))
}

fn resolve_base_command(
    agent_specific: Option<&str>,
    global: Option<&str>,
    agent_name: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let base = agent_specific
        .or(global)
        .or_else(|| agent_data::get_default_command(agent_name))
        .ok_or_else(|| {
            format!(
                "No command found for agent '{}'. Configure a startup_command in your config file \
                or use a known agent ({}).",
                agent_name,
                agent_data::known_agents_string()
            )
        })?;

    Ok(base.to_string())
}

fn build_command(base: &str, flags: Option<&str>) -> String {
    match flags {
        Some(f) => format!("{} {}", base, f),
        None => base.to_string(),
    }
}

/// Resolve a user-facing model variant alias to its canonical model string.
///
/// Returns `None` if the alias has no entry in `[models]` — callers treat
/// the variant itself as the canonical model in that case.
pub fn resolve_model_alias<'a>(config: &'a NtmConfig, alias: &str) -> Option<&'a str> {
    config.models.get(alias).map(String::as_str)
}
