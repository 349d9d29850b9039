//! # ntm-config
//!
//! TOML configuration types, loading, and validation for ntm.
//!
//! Single source of truth for `NtmConfig`. Depends only on `ntm-paths`.

mod agent_data;
mod defaults;
mod loading;
mod validation;

pub mod errors;
pub mod types;

pub use errors::ConfigError;
pub use loading::{get_agent_command, load_hierarchy, merge_configs, resolve_model_alias};
pub use types::{
    AgentConfig, AgentSettings, NtmConfig, PolicyConfig, ReadinessConfig, RecoveryConfig,
    StaggerConfig, SupervisorConfig,
};
pub use validation::validate_config;

impl NtmConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    /// Get the command to run for a specific agent.
    ///
    /// See [`loading::get_agent_command`] for details.
    pub fn get_agent_command(
        &self,
        agent_name: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        loading::get_agent_command(self, agent_name)
    }

    /// Resolve a user-facing model variant alias to its canonical model.
    pub fn resolve_model_alias(&self, alias: &str) -> Option<&str> {
        loading::resolve_model_alias(self, alias)
    }
}
