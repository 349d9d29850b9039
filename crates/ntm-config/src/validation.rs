//! Configuration validation logic.

use crate::errors::ConfigError;
use crate::types::NtmConfig;

/// Validate an `NtmConfig`, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Model alias table entries must not resolve to an empty string.
/// - Stagger interval, if configured, must be nonzero.
/// - Readiness poll interval, if configured, must be nonzero and not exceed
///   the ready-timeout.
///
/// Agent names are not validated against a closed set — `Plugin` agent
/// kinds are open-ended by design (see the data model's `AgentSpec`), so an
/// unrecognized `agent.default` only fails later, at `get_agent_command()`
/// time, if no command can be resolved for it.
pub fn validate_config(config: &NtmConfig) -> Result<(), ConfigError> {
    for (alias, model) in &config.models {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("model alias '{alias}' resolves to an empty model string"),
            });
        }
    }

    if let Some(interval) = config.stagger.default_interval_secs
        && interval == 0
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "stagger.default_interval_secs must be greater than zero".to_string(),
        });
    }

    if let Some(interval) = config.readiness.poll_interval_secs
        && interval == 0
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "readiness.poll_interval_secs must be greater than zero".to_string(),
        });
    }

    if config.readiness.poll_interval_secs() > config.readiness.ready_timeout_secs() {
        return Err(ConfigError::InvalidConfiguration {
            message: "readiness.poll_interval_secs must not exceed readiness.ready_timeout_secs"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReadinessConfig, StaggerConfig};

    #[test]
    fn test_config_validation_default_is_ok() {
        let config = NtmConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_empty_model_alias_fails() {
        let mut config = NtmConfig::default();
        config.models.insert("fast".to_string(), "".to_string());

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidConfiguration { .. }
        ));
    }

    #[test]
    fn test_config_validation_valid_model_alias() {
        let mut config = NtmConfig::default();
        config
            .models
            .insert("fast".to_string(), "claude-haiku".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_zero_stagger_interval_fails() {
        let mut config = NtmConfig::default();
        config.stagger = StaggerConfig {
            default_interval_secs: Some(0),
        };

        let result = validate_config(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_zero_readiness_poll_fails() {
        let mut config = NtmConfig::default();
        config.readiness = ReadinessConfig {
            poll_interval_secs: Some(0),
            ready_timeout_secs: None,
            idle_markers: None,
        };

        let result = validate_config(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_poll_interval_exceeding_timeout_fails() {
        let mut config = NtmConfig::default();
        config.readiness = ReadinessConfig {
            poll_interval_secs: Some(200),
            ready_timeout_secs: Some(60),
            idle_markers: None,
        };

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidConfiguration { .. }
        ));
    }
}
