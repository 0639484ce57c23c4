use std::path::Path;
use crate::errors::ChainError;
use super::types::ChainConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<ChainConfig, ChainError> {
    if !path.exists() {
        return Err(ChainError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(ChainError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<ChainConfig, ChainError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // An empty file is a valid, all-defaults config
    if yaml.is_null() {
        debug!("Config file is empty, using defaults");
        return Ok(ChainConfig::default());
    }

    validate_schema(&yaml)?;

    let config: ChainConfig = serde_yaml::from_value(yaml)?;
    config.validate()?;

    Ok(config)
}

/// Check the raw document against the JSON schema. Mismatches are reported
/// as warnings; typed parsing and `ChainConfig::validate` are authoritative.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), ChainError> {
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| ChainError::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| ChainError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| ChainError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        for e in errors {
            warn!(validation_error = %e, path = %e.instance_path, "Config schema warning");
        }
    }

    Ok(())
}
