//! Configuration for schema derivation and delta merging.
//!
//! Every field has a default, so an empty document (or no document) is valid:
//!
//! ```yaml
//! schema:
//!   additional_properties: false
//!   include_defaults: true
//!   close_nested_objects: false
//! merge:
//!   stripped_keys: [role]
//! ```

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "AI_LIB_TOOLS_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub schema: SchemaConfig,
    pub merge: MergeConfig,
}

/// Structured schema options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Allow properties beyond the declared parameters (emits no `additionalProperties`).
    pub additional_properties: bool,
    /// Emit a `default` keyword for parameters that have one.
    pub include_defaults: bool,
    /// Add `additionalProperties: false` to nested record schemas that do not set it
    /// (provider strict mode).
    pub close_nested_objects: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            additional_properties: false,
            include_defaults: true,
            close_nested_objects: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Top-level delta keys dropped before merging.
    pub stripped_keys: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            stripped_keys: default_stripped_keys(),
        }
    }
}

fn default_stripped_keys() -> Vec<String> {
    vec!["role".to_string()]
}

impl ToolConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(Error::configuration_with_context(
                "Unsupported configuration format",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(format!("extension: {}", other.unwrap_or("<none>")))
                    .with_source("tool_config"),
            )),
        }
    }

    /// Load the file named by `AI_LIB_TOOLS_CONFIG`, or defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::debug!(path = path.as_str(), "loading tool configuration");
                Self::from_path(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert!(!config.schema.additional_properties);
        assert!(config.schema.include_defaults);
        assert!(!config.schema.close_nested_objects);
        assert_eq!(config.merge.stripped_keys, vec!["role"]);
        assert_eq!(ToolConfig::from_yaml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ToolConfig::from_yaml_str("schema:\n  additional_properties: true\n").unwrap();
        assert!(config.schema.additional_properties);
        assert!(config.schema.include_defaults);
        assert_eq!(config.merge.stripped_keys, vec!["role"]);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = ToolConfig::from_yaml_str("schema: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = std::env::temp_dir().join("ai_lib_tools_config_test.toml");
        std::fs::write(&dir, "").unwrap();
        let err = ToolConfig::from_path(&dir).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        let _ = std::fs::remove_file(&dir);
    }
}
