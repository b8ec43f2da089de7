//! Configuration loading via `ortho-config`.
//!
//! Two layers feed the snapshotter: [`GatewayConfig`] carries provider
//! credentials sourced from the environment (or a configuration file), and
//! [`PluginConfig`] retains the string map the orchestrator hands over at
//! initialisation.

use std::collections::BTreeMap;
use std::fmt;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::descriptor::DescriptorStrategy;

/// Default DigitalOcean API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// Init option selecting how persistent volume descriptors are accessed.
pub const DESCRIPTOR_STRATEGY_KEY: &str = "descriptorStrategy";

/// DigitalOcean credentials derived from environment variables and
/// configuration files.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "DIGITALOCEAN")]
pub struct GatewayConfig {
    /// Personal access token used as the bearer credential. Required.
    pub token: String,
    /// Base URL of the API. Defaults to the public DigitalOcean endpoint.
    #[ortho_config(default = DEFAULT_API_URL.to_owned())]
    pub api_url: String,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl GatewayConfig {
    /// Builds a configuration from explicit values, bypassing the loader.
    #[must_use]
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_owned(),
            api_url: api_url.into().trim().to_owned(),
        }
    }

    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to dosnap.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("dosnap")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.token,
            &FieldMetadata::new("DigitalOcean access token", "DIGITALOCEAN_TOKEN", "token"),
        )?;
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("DigitalOcean API URL", "DIGITALOCEAN_API_URL", "api_url"),
        )?;
        Ok(())
    }
}

/// Options handed to the snapshotter by the orchestrator at initialisation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PluginConfig {
    descriptor_strategy: DescriptorStrategy,
    raw: BTreeMap<String, String>,
}

impl PluginConfig {
    /// Parses recognised keys and retains the full map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] when a recognised key carries an
    /// unsupported value.
    pub fn from_map(raw: BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let descriptor_strategy = match raw.get(DESCRIPTOR_STRATEGY_KEY) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidOption {
                key: DESCRIPTOR_STRATEGY_KEY.to_owned(),
                value: value.clone(),
            })?,
            None => DescriptorStrategy::default(),
        };
        Ok(Self {
            descriptor_strategy,
            raw,
        })
    }

    /// Strategy used to read and write the volume handle in descriptors.
    #[must_use]
    pub const fn descriptor_strategy(&self) -> DescriptorStrategy {
        self.descriptor_strategy
    }

    /// Returns the retained value for `key`, if the orchestrator supplied one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Raised when an init option has an unsupported value.
    #[error("unsupported value '{value}' for option {key}")]
    InvalidOption {
        /// Option name.
        key: String,
        /// Value supplied by the orchestrator.
        value: String,
    },
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    #[case(&[], DescriptorStrategy::Unstructured)]
    #[case(&[("descriptorStrategy", "typed")], DescriptorStrategy::Typed)]
    #[case(&[("descriptorStrategy", " unstructured ")], DescriptorStrategy::Unstructured)]
    fn plugin_config_selects_descriptor_strategy(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: DescriptorStrategy,
    ) {
        let config = PluginConfig::from_map(map(pairs)).expect("valid options");
        assert_eq!(config.descriptor_strategy(), expected);
    }

    #[test]
    fn plugin_config_rejects_unknown_strategy() {
        let err = PluginConfig::from_map(map(&[("descriptorStrategy", "xml")]))
            .expect_err("unknown strategy");
        assert_eq!(
            err,
            ConfigError::InvalidOption {
                key: String::from("descriptorStrategy"),
                value: String::from("xml"),
            }
        );
    }

    #[test]
    fn plugin_config_retains_unrecognised_keys() {
        let config = PluginConfig::from_map(map(&[("region", "nyc3")])).expect("valid options");
        assert_eq!(config.get("region"), Some("nyc3"));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = GatewayConfig::new("dop_v1_secret", DEFAULT_API_URL);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("dop_v1_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
