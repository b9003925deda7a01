use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let compiled =
        jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
            message: format!("Failed to compile JSON schema: {}", e),
        })?;

    let error_messages: Vec<String> = compiled
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let accuracy = &config.tiers.accuracy;
    if accuracy.high <= accuracy.medium {
        return Err(ConfigError::InvalidTierScheme {
            scheme: "accuracy".to_string(),
            reason: format!(
                "thresholds must be strictly descending (high {} <= medium {})",
                accuracy.high, accuracy.medium
            ),
        });
    }

    let discovery = &config.tiers.discovery;
    if discovery.high <= discovery.medium || discovery.medium <= discovery.low {
        return Err(ConfigError::InvalidTierScheme {
            scheme: "discovery".to_string(),
            reason: format!(
                "thresholds must be strictly descending (high {}, medium {}, low {})",
                discovery.high, discovery.medium, discovery.low
            ),
        });
    }

    let staleness = &config.staleness;
    if staleness.applied_silent_days <= staleness.applied_followup_days {
        return Err(ConfigError::Validation {
            message: format!(
                "applied_silent_days ({}) must exceed applied_followup_days ({})",
                staleness.applied_silent_days, staleness.applied_followup_days
            ),
        });
    }

    Ok(())
}
