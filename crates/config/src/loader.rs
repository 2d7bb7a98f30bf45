//! Configuration loader implementation

use crate::definition::ROOT;
use crate::schema::ApiDocConfig;
use crate::validation::ConfigValidator;
use anyhow::{Context, Result};
use apidoc_types::ConfigError;
use figment::{providers::Env, Figment};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Prefix of environment variables overriding file configuration
pub const ENV_PREFIX: &str = "NELMIO_API_DOC_";

/// Configuration loader that handles YAML files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<ApiDocConfig> {
        Self::load_files(&[config_path])
    }

    /// Load configuration from several files, later files overriding earlier ones.
    ///
    /// Environment variables prefixed with `NELMIO_API_DOC_` are applied last;
    /// nested keys are separated by `__` (`NELMIO_API_DOC_HTML_CONFIG__ASSETS_MODE`).
    pub fn load_files<P: AsRef<Path>>(config_paths: &[P]) -> Result<ApiDocConfig> {
        let mut fragments = Vec::with_capacity(config_paths.len() + 1);

        for config_path in config_paths {
            let config_path = config_path.as_ref();

            // Check if config file exists
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: config_path.display().to_string(),
                }
                .into());
            }

            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;
            let fragment = Self::parse(&content)
                .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))?;
            debug!(path = %config_path.display(), "Configuration file read");
            fragments.push(fragment);
        }

        if let Some(overrides) = Self::env_overrides()? {
            info!("Applying {} environment overrides", ENV_PREFIX);
            fragments.push(overrides);
        }

        let config = crate::process(&fragments)?;
        Self::report(&config);
        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<ApiDocConfig> {
        let fragment = Self::parse(yaml_content).context("Failed to parse configuration from string")?;

        let config = crate::validate(&fragment)?;
        Self::report(&config);
        Ok(config)
    }

    /// Get default configuration
    pub fn default() -> ApiDocConfig {
        ApiDocConfig::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = serde_yaml::to_value(Self::default())
            .context("Failed to serialize default configuration")?;

        let mut root = Mapping::new();
        root.insert(Value::from(ROOT), config);
        let yaml_content = serde_yaml::to_string(&root)
            .context("Failed to serialize default configuration")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example configuration file")?;

        Ok(())
    }

    /// Parse YAML text into a raw tree, unwrapping the `nelmio_api_doc` root key when present.
    ///
    /// Keys keep their YAML type, so `{0: group2}` inside `groups` stays an integer key.
    fn parse(content: &str) -> Result<Value> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(match value {
            Value::Mapping(mut map) if map.contains_key(ROOT) => map.remove(ROOT).unwrap_or(Value::Null),
            other => other,
        })
    }

    fn env_overrides() -> Result<Option<Value>> {
        let value: Value = Figment::from(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to read environment overrides")?;

        Ok(match value {
            Value::Mapping(map) if map.is_empty() => None,
            Value::Null => None,
            other => Some(other),
        })
    }

    /// Log the advisory findings for a configuration that passed the schema
    fn report(config: &ApiDocConfig) {
        let report = ConfigValidator::validate(config);
        for issue in &report.errors {
            warn!(field = %issue.field, "{}", issue.message);
        }
        for issue in &report.warnings {
            warn!(field = %issue.field, "{}", issue.message);
        }
        debug!("{}", report.summary());
    }
}
