//! Configuration validation utilities
//!
//! The schema already rejects malformed configuration. The checks here run on
//! a configuration that passed the schema and flag settings that are legal but
//! most likely mistakes.

use crate::definition::DEFAULT_AREA;
use crate::schema::{ApiDocConfig, AreaConfig};
use apidoc_types::AssetsMode;
use regex::Regex;
use std::collections::HashMap;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &ApiDocConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_areas(config, &mut report);
        Self::validate_models(config, &mut report);
        Self::validate_media_types(config, &mut report);
        Self::validate_html(config, &mut report);

        report
    }

    fn validate_areas(config: &ApiDocConfig, report: &mut ValidationReport) {
        for (name, area) in &config.areas {
            Self::validate_patterns(name, "path_patterns", &area.path_patterns, report);
            Self::validate_patterns(name, "host_patterns", &area.host_patterns, report);
            Self::validate_patterns(name, "name_patterns", &area.name_patterns, report);

            if name != DEFAULT_AREA && Self::matches_everything(area) {
                report.add_warning(
                    &format!("areas.{}", name),
                    &format!("Area {} has no patterns and documents every route", name),
                );
            }
        }
    }

    fn validate_patterns(area: &str, field: &str, patterns: &[String], report: &mut ValidationReport) {
        for pattern in patterns {
            if pattern.is_empty() {
                report.add_error(
                    &format!("areas.{}.{}", area, field),
                    &format!("Empty pattern in area {}", area),
                );
            } else if let Err(e) = Regex::new(pattern) {
                // Lookaround and backreferences are valid for the route matcher but not for `regex`
                report.add_warning(
                    &format!("areas.{}.{}", area, field),
                    &format!("Pattern {} of area {} could not be checked: {}", pattern, area, e),
                );
            }
        }
    }

    fn matches_everything(area: &AreaConfig) -> bool {
        area.path_patterns.is_empty()
            && area.host_patterns.is_empty()
            && area.name_patterns.is_empty()
            && !area.with_annotation
    }

    fn validate_models(config: &ApiDocConfig, report: &mut ValidationReport) {
        let mut seen: HashMap<&str, Vec<&[String]>> = HashMap::new();

        for (index, model) in config.models.names.iter().enumerate() {
            for area in &model.areas {
                if !config.areas.contains_key(area) {
                    report.add_error(
                        &format!("models.names.{}.areas", index),
                        &format!("Model alias {} references undefined area {}", model.alias, area),
                    );
                }
            }

            let previous = seen.entry(model.alias.as_str()).or_default();
            if previous.iter().any(|areas| Self::areas_overlap(areas, &model.areas)) {
                report.add_warning(
                    &format!("models.names.{}", index),
                    &format!("Duplicate model alias {}, the last definition wins", model.alias),
                );
            }
            previous.push(&model.areas);
        }
    }

    /// Empty area lists mean "every area"
    fn areas_overlap(left: &[String], right: &[String]) -> bool {
        left.is_empty() || right.is_empty() || left.iter().any(|area| right.contains(area))
    }

    fn validate_media_types(config: &ApiDocConfig, report: &mut ValidationReport) {
        if config.media_types.is_empty() {
            report.add_warning("media_types", "No media types configured, request and response bodies will not be documented");
        }
    }

    fn validate_html(config: &ApiDocConfig, report: &mut ValidationReport) {
        if config.html_config.assets_mode == AssetsMode::Cdn && !config.html_config.redocly_config.is_empty() {
            report.add_warning(
                "html_config.redocly_config",
                "Redocly options are only applied to bundled or offline assets",
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelName;

    fn model(alias: &str, areas: &[&str]) -> ModelName {
        ModelName {
            alias: alias.to_string(),
            type_name: format!("App\\{}", alias),
            groups: None,
            areas: areas.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_config_is_clean() {
        let report = ConfigValidator::validate(&ApiDocConfig::default());
        assert!(!report.has_errors());
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary(), "Validation: 0 errors, 0 warnings");
    }

    #[test]
    fn test_undefined_area_reference() {
        let mut config = ApiDocConfig::default();
        config.models.names.push(model("Foo", &["internal"]));

        let report = ConfigValidator::validate(&config);
        assert!(report.has_errors());
        assert_eq!(report.errors[0].field, "models.names.0.areas");
    }

    #[test]
    fn test_duplicate_alias_warning() {
        let mut config = ApiDocConfig::default();
        config.areas.insert("internal".to_string(), AreaConfig {
            path_patterns: vec!["^/internal".to_string()],
            ..AreaConfig::default()
        });
        config.areas.insert("public".to_string(), AreaConfig {
            path_patterns: vec!["^/public".to_string()],
            ..AreaConfig::default()
        });
        config.models.names = vec![
            model("Foo", &["internal"]),
            model("Foo", &["public"]),
            model("Foo", &[]),
        ];

        let report = ConfigValidator::validate(&config);
        assert!(!report.has_errors());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "models.names.2");
    }

    #[test]
    fn test_catch_all_area_warning() {
        let mut config = ApiDocConfig::default();
        config.areas.insert("internal".to_string(), AreaConfig::default());

        let report = ConfigValidator::validate(&config);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "areas.internal");
    }

    #[test]
    fn test_patterns() {
        let mut config = ApiDocConfig::default();
        config.areas.insert("api".to_string(), AreaConfig {
            path_patterns: vec!["^/api(?!/doc$)".to_string(), String::new()],
            ..AreaConfig::default()
        });

        let report = ConfigValidator::validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "areas.api.path_patterns");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_issue_severities() {
        let mut config = ApiDocConfig::default();
        config.areas.insert("api".to_string(), AreaConfig {
            path_patterns: vec![String::new(), "^/api(?!/doc$)".to_string()],
            ..AreaConfig::default()
        });
        config.areas.insert("internal".to_string(), AreaConfig::default());
        config.models.names = vec![model("Foo", &["missing"]), model("Foo", &[])];
        config.media_types.clear();
        config.html_config.redocly_config.insert("hideDownloadButton".into(), true.into());

        let report = ConfigValidator::validate(&config);
        let errors: Vec<&str> = report.errors.iter().map(|issue| issue.field.as_str()).collect();
        let warnings: Vec<&str> = report.warnings.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(errors, vec!["areas.api.path_patterns", "models.names.0.areas"]);
        assert_eq!(
            warnings,
            vec![
                "areas.api.path_patterns",
                "areas.internal",
                "models.names.1",
                "media_types",
                "html_config.redocly_config",
            ]
        );
        assert_eq!(report.summary(), "Validation: 2 errors, 5 warnings");
    }
}
