//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ClientConfigFile;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, Configuration};

/// Load, validate and build a configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let content = fs::read_to_string(path)?;
    let configuration = from_toml_str(&content)?;
    tracing::info!(path = %path.display(), "Loaded client configuration");
    Ok(configuration)
}

/// Parse, validate and build a configuration from TOML text.
pub fn from_toml_str(content: &str) -> Result<Configuration, ConfigError> {
    let file: ClientConfigFile = toml::from_str(content)?;
    validate_config(&file).map_err(ConfigError::Validation)?;
    Ok(file.into_configuration())
}
