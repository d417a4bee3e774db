//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// The configuration file name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "nocmap.toml";

/// Largest mesh accepted, in nodes. Routing tables hold an entry per
/// (node, source, destination) triple.
pub const MAX_MESH_NODES: u32 = 256;

/// Loads and validates `nocmap.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
///
/// Rates are not range-checked here; the task model rejects them when the
/// traffic is built, so the same check covers inputs from other sources.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }

    let (rows, cols) = config.topology.dimensions()?;
    if rows == 0 || cols == 0 {
        return Err(ConfigError::ValidationError(format!(
            "mesh must have at least one row and column, got {rows}x{cols}"
        )));
    }
    if rows.checked_mul(cols).map_or(true, |n| n > MAX_MESH_NODES) {
        return Err(ConfigError::ValidationError(format!(
            "mesh {rows}x{cols} exceeds the {MAX_MESH_NODES} node limit"
        )));
    }
    if !(config.topology.link_bandwidth >= 0.0) {
        return Err(ConfigError::ValidationError(
            "topology.link_bandwidth must be non-negative".to_string(),
        ));
    }

    let cores = config.core_count();
    if cores == 0 {
        return Err(ConfigError::MissingField("cores".to_string()));
    }

    for (i, traffic) in config.traffic.iter().enumerate() {
        if traffic.src as usize >= cores || traffic.dst as usize >= cores {
            return Err(ConfigError::ValidationError(format!(
                "traffic[{i}] references core {} -> {} but only {cores} cores are declared",
                traffic.src, traffic.dst
            )));
        }
        if traffic.src == traffic.dst {
            return Err(ConfigError::ValidationError(format!(
                "traffic[{i}] sends from core {} to itself",
                traffic.src
            )));
        }
        match (traffic.bandwidth, traffic.rate) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ValidationError(format!(
                    "traffic[{i}] sets both bandwidth and rate"
                )))
            }
            (None, None) => {
                return Err(ConfigError::MissingField(format!(
                    "traffic[{i}].bandwidth or traffic[{i}].rate"
                )))
            }
            _ => {}
        }
    }

    if let Some(t) = config.anneal.initial_temperature {
        if !(t > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "anneal.initial_temperature must be positive, got {t}"
            )));
        }
    }

    if let Some(rate) = config.anneal.cooling_rate {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "anneal.cooling_rate must lie in (0, 1), got {rate}"
            )));
        }
    }

    Ok(())
}
