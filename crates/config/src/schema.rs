//! Typed view of the normalized configuration

use crate::definition::{DEFAULT_AREA, DEFAULT_MEDIA_TYPES};
use apidoc_types::{AssetsMode, ConfigError, OperationIdGeneration};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocConfig {
    /// Describe models with their validation groups
    pub use_validation_groups: bool,
    /// Operation id strategy
    pub operation_id_generation: OperationIdGeneration,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Base documentation shared by every area
    pub documentation: Mapping,
    /// Enabled media types
    pub media_types: Vec<String>,
    /// Documentation UI rendering
    pub html_config: HtmlConfig,
    /// Documentation areas by name; always contains `default`
    pub areas: BTreeMap<String, AreaConfig>,
    /// Model describers configuration
    pub models: ModelsConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache pool service id
    pub pool: Option<String>,
    /// Cache item id; requires a pool
    pub item_id: Option<String>,
}

/// Documentation UI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlConfig {
    pub assets_mode: AssetsMode,
    pub swagger_ui_config: Mapping,
    pub redocly_config: Mapping,
    pub stoplight_config: Mapping,
}

/// A named documentation scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaConfig {
    pub path_patterns: Vec<String>,
    pub host_patterns: Vec<String>,
    pub name_patterns: Vec<String>,
    pub with_annotation: bool,
    pub disable_default_routes: bool,
    pub documentation: Mapping,
}

/// Model describers configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Describe models through JMS serializer metadata
    pub use_jms: bool,
    /// Alternative model names, in declaration order
    pub names: Vec<ModelName>,
}

/// An alias for a model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelName {
    pub alias: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Serialization groups; `None` means "no groups", unlike an empty list.
    /// Elements are kept as written, nested entries included.
    pub groups: Option<Vec<Value>>,
    /// Areas the alias applies to; empty means every area
    pub areas: Vec<String>,
}

impl ApiDocConfig {
    /// Convert a finalized configuration tree into its typed form
    pub fn from_normalized(value: Value) -> Result<Self, ConfigError> {
        serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Area by name
    pub fn area(&self, name: &str) -> Option<&AreaConfig> {
        self.areas.get(name)
    }

    /// The area every configuration defines
    pub fn default_area(&self) -> Option<&AreaConfig> {
        self.area(DEFAULT_AREA)
    }

    /// Model names that apply to `area`
    pub fn models_for_area<'a>(&'a self, area: &'a str) -> impl Iterator<Item = &'a ModelName> + 'a {
        self.models.names.iter().filter(move |name| name.applies_to(area))
    }
}

impl ModelName {
    /// Whether the alias is registered for `area`
    pub fn applies_to(&self, area: &str) -> bool {
        self.areas.is_empty() || self.areas.iter().any(|a| a == area)
    }
}

impl Default for ApiDocConfig {
    fn default() -> Self {
        let mut areas = BTreeMap::new();
        areas.insert(DEFAULT_AREA.to_string(), AreaConfig::default());

        Self {
            use_validation_groups: false,
            operation_id_generation: OperationIdGeneration::default(),
            cache: CacheConfig::default(),
            documentation: Mapping::new(),
            media_types: DEFAULT_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
            html_config: HtmlConfig::default(),
            areas,
            models: ModelsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(alias: &str, areas: &[&str]) -> ModelName {
        ModelName {
            alias: alias.to_string(),
            type_name: "App\\Foo".to_string(),
            groups: None,
            areas: areas.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ApiDocConfig::default();
        assert_eq!(config.media_types, vec!["json".to_string()]);
        assert_eq!(config.html_config.assets_mode, AssetsMode::Cdn);
        assert_eq!(config.default_area(), Some(&AreaConfig::default()));
        assert!(config.area("internal").is_none());
    }

    #[test]
    fn test_models_for_area() {
        let mut config = ApiDocConfig::default();
        config.models.names = vec![model("Everywhere", &[]), model("Internal", &["internal"])];

        let default: Vec<_> = config.models_for_area("default").map(|m| m.alias.as_str()).collect();
        assert_eq!(default, vec!["Everywhere"]);

        let internal: Vec<_> = config.models_for_area("internal").map(|m| m.alias.as_str()).collect();
        assert_eq!(internal, vec!["Everywhere", "Internal"]);
    }

    #[test]
    fn test_model_type_serializes_as_type() {
        let value = serde_yaml::to_value(model("Foo", &[])).unwrap();
        assert_eq!(value["type"], Value::from("App\\Foo"));
        assert_eq!(value["groups"], Value::Null);
    }
}
