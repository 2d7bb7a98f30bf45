//! Command implementations

use anyhow::{bail, Context, Result};
use apidoc_config::{configuration_tree, ApiDocConfig, ConfigLoader, ConfigValidator, ValidationReport, ROOT};
use apidoc_types::ConfigError;
use clap::ValueEnum;
use std::path::PathBuf;

/// Rendering of the normalized configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Load, merge and check `files`; returns the text to print
pub fn validate(files: &[PathBuf], format: OutputFormat, quiet: bool) -> Result<String> {
    let config = ConfigLoader::load_files(files)?;
    let report = ConfigValidator::validate(&config);

    let mut output = String::new();
    if !quiet {
        output.push_str(&render(&config, format)?);
    }
    output.push_str(&render_report(&report));

    if report.has_errors() {
        bail!("{}\n{}", report.summary(), render_report(&report));
    }
    Ok(output)
}

/// Render a configuration under its root key
pub fn render(config: &ApiDocConfig, format: OutputFormat) -> Result<String> {
    let value = serde_json::json!({ ROOT: config });
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(&value).context("Failed to render configuration as YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(&value)
            .map(|json| json + "\n")
            .context("Failed to render configuration as JSON"),
    }
}

/// One line per option: path, default and description
pub fn reference() -> String {
    let tree = configuration_tree();
    let mut output = String::new();
    for (path, node) in tree.leaves() {
        let default = match node.implicit_default() {
            Some(value) => serde_json::to_string(&value).unwrap_or_default(),
            None if node.required => "(required)".to_string(),
            None => "~".to_string(),
        };
        output.push_str(&format!("{}: {}", path, default));
        if let Some(info) = node.info {
            output.push_str(&format!("  # {}", info));
        }
        output.push('\n');
    }
    output
}

/// Schema violations are reported as `path: message` and exit with 2, anything else with 1
pub fn describe_failure(err: &anyhow::Error) -> (i32, String) {
    match err.downcast_ref::<ConfigError>() {
        Some(config_error) if config_error.is_validation() => (
            2,
            format!("{}: {}", config_error.path().unwrap_or(ROOT), config_error.message()),
        ),
        _ => (1, format!("{:#}", err)),
    }
}

fn render_report(report: &ValidationReport) -> String {
    let mut output = String::new();
    for issue in &report.errors {
        output.push_str(&format!("error: {}: {}\n", issue.field, issue.message));
    }
    for issue in &report.warnings {
        output.push_str(&format!("warning: {}: {}\n", issue.field, issue.message));
    }
    output
}
