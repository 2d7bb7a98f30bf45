//! Configuration engine for the API documentation bundle
//!
//! This crate defines the `nelmio_api_doc` configuration schema, normalizes
//! raw configuration trees against it and exposes the result as a typed
//! [`ApiDocConfig`]. Files and environment variables are handled by
//! [`ConfigLoader`]; advisory checks on a valid configuration live in
//! [`ConfigValidator`].

pub mod definition;
pub mod loader;
pub mod node;
pub mod processor;
pub mod schema;
pub mod validation;

pub use definition::{configuration_tree, DEFAULT_AREA, ROOT};
pub use loader::ConfigLoader;
pub use node::{Node, NodeKind, RuleKind, ScalarType};
pub use processor::Processor;
pub use schema::*;
pub use validation::*;

use apidoc_types::Result;
use serde_yaml::Value;

/// Validate and normalize a single raw configuration tree
pub fn validate(raw: &Value) -> Result<ApiDocConfig> {
    process(std::slice::from_ref(raw))
}

/// Validate, merge and normalize several raw configuration trees, later ones winning
pub fn process(fragments: &[Value]) -> Result<ApiDocConfig> {
    let tree = configuration_tree();
    let normalized = Processor::process(&tree, fragments)?;
    ApiDocConfig::from_normalized(normalized)
}
