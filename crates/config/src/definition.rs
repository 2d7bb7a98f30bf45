//! The `nelmio_api_doc` configuration tree

use crate::node::{Node, RuleKind};
use apidoc_types::utils::display_value;
use apidoc_types::{AssetsMode, OperationIdGeneration};
use serde_yaml::{Mapping, Value};

/// Root key of the configuration
pub const ROOT: &str = "nelmio_api_doc";

/// Name of the area every configuration must define
pub const DEFAULT_AREA: &str = "default";

/// Media types documented when none are configured
pub const DEFAULT_MEDIA_TYPES: &[&str] = &["json"];

/// Keys of an area definition
const AREA_FIELDS: &[&str] = &[
    "path_patterns",
    "host_patterns",
    "name_patterns",
    "with_annotation",
    "disable_default_routes",
    "documentation",
];

/// Build the full configuration tree
pub fn configuration_tree() -> Node {
    Node::structure(
        ROOT,
        vec![
            Node::boolean("use_validation_groups")
                .default_value(false)
                .info("Whether validation groups are used when describing models"),
            Node::enumeration("operation_id_generation", OperationIdGeneration::ALL)
                .default_value(OperationIdGeneration::default().as_str())
                .info("How operation ids are generated for routes documented more than once"),
            cache_node(),
            Node::document("documentation").info("The documentation used as base"),
            Node::string_list("media_types")
                .default_value(media_types_default())
                .info("List of enabled media types"),
            html_config_node(),
            areas_node(),
            models_node(),
        ],
    )
}

fn cache_node() -> Node {
    Node::structure(
        "cache",
        vec![
            Node::scalar("pool")
                .default_null()
                .info("Define cache pool to use"),
            Node::scalar("item_id")
                .default_null()
                .info("Define cache item id"),
        ],
    )
    .validate(RuleKind::CrossField, |cache| {
        (cache["pool"].is_null() && !cache["item_id"].is_null())
            .then(|| "Can not set cache.item_id if cache.pool is null".to_string())
    })
}

fn html_config_node() -> Node {
    Node::structure(
        "html_config",
        vec![
            Node::scalar("assets_mode")
                .default_value(AssetsMode::default().as_str())
                .validate(RuleKind::Enum, |mode| display_value(mode).parse::<AssetsMode>().err()),
            Node::document("swagger_ui_config"),
            Node::document("redocly_config"),
            Node::document("stoplight_config"),
        ],
    )
}

/// Prototype of a single area
pub fn area_node() -> Node {
    Node::structure(
        "",
        vec![
            Node::string_list("path_patterns").info("Path patterns (regular expressions) of routes to document"),
            Node::string_list("host_patterns").info("Host patterns (regular expressions) of routes to document"),
            Node::string_list("name_patterns").info("Route name patterns (regular expressions) of routes to document"),
            Node::boolean("with_annotation")
                .default_value(false)
                .info("Whether only routes carrying documentation attributes are documented"),
            Node::boolean("disable_default_routes")
                .default_value(false)
                .info("Whether to skip the default routes of the area"),
            Node::document("documentation").info("Documentation merged into the base documentation of this area"),
        ],
    )
}

fn areas_node() -> Node {
    let area = area_node();
    let mut default_areas = Mapping::new();
    if let Some(default_area) = area.implicit_default() {
        default_areas.insert(Value::from(DEFAULT_AREA), default_area);
    }

    Node::keyed("areas", "name", area)
        .default_value(Value::Mapping(default_areas))
        .before(wrap_default_area)
        .validate(RuleKind::MissingKey, |areas| {
            areas.get(DEFAULT_AREA).is_none().then(|| {
                format!(
                    "You must specify a `{}` area under `{}.areas`.",
                    DEFAULT_AREA, ROOT
                )
            })
        })
}

/// `areas: {path_patterns: [...]}` configures the default area directly
fn wrap_default_area(areas: Value) -> Value {
    match areas {
        Value::Mapping(map)
            if map.get(DEFAULT_AREA).is_none()
                && AREA_FIELDS.iter().any(|field| map.contains_key(*field)) =>
        {
            let mut wrapped = Mapping::new();
            wrapped.insert(Value::from(DEFAULT_AREA), Value::Mapping(map));
            Value::Mapping(wrapped)
        }
        other => other,
    }
}

fn models_node() -> Node {
    Node::structure(
        "models",
        vec![
            Node::boolean("use_jms").default_value(false),
            Node::list(
                "names",
                Node::structure(
                    "",
                    vec![
                        Node::scalar("alias").required().not_empty(),
                        Node::scalar("type").required().not_empty(),
                        Node::variable("groups")
                            .default_null()
                            .validate(RuleKind::TypeMismatch, |groups| {
                                (!groups.is_null() && !groups.is_sequence()).then(|| {
                                    "Model groups must be either `null` or an array.".to_string()
                                })
                            }),
                        Node::string_list("areas"),
                    ],
                ),
            ),
        ],
    )
}

fn media_types_default() -> Value {
    Value::Sequence(DEFAULT_MEDIA_TYPES.iter().map(|t| Value::from(*t)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::Processor;

    fn process(source: &str) -> apidoc_types::Result<Value> {
        let raw: Value = serde_yaml::from_str(source).unwrap();
        Processor::process(&configuration_tree(), &[raw])
    }

    #[test]
    fn test_tree_root() {
        let tree = configuration_tree();
        assert_eq!(tree.name, ROOT);
        for key in ["cache", "documentation", "media_types", "html_config", "areas", "models"] {
            assert!(tree.child(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_wrap_default_area_only_with_area_fields() {
        let wrapped = wrap_default_area(serde_yaml::from_str("{path_patterns: [/foo]}").unwrap());
        assert_eq!(wrapped, serde_yaml::from_str::<Value>("{default: {path_patterns: [/foo]}}").unwrap());

        let untouched: Value = serde_yaml::from_str("{internal: {}}").unwrap();
        assert_eq!(wrap_default_area(untouched.clone()), untouched);
    }

    #[test]
    fn test_assets_mode_accepts_every_mode() {
        for mode in AssetsMode::ALL {
            let value = process(&format!("{{html_config: {{assets_mode: {}}}}}", mode)).unwrap();
            assert_eq!(value["html_config"]["assets_mode"], Value::from(*mode));
        }
    }

    #[test]
    fn test_operation_id_generation_is_enumerated() {
        let err = process("{operation_id_generation: sometimes}").unwrap_err();
        assert!(err.to_string().contains("Permissible values: \"always_prepend\", \"conditionally_prepend\", \"no_prepend\""));
    }

    #[test]
    fn test_model_alias_is_required() {
        let err = process("{models: {names: [{type: App\\Foo}]}}").unwrap_err();
        assert_eq!(err.path(), Some("nelmio_api_doc.models.names.0"));
        assert!(err.to_string().contains(
            "The child config \"alias\" under \"nelmio_api_doc.models.names.0\" must be configured."
        ));
    }

    #[test]
    fn test_model_alias_cannot_be_empty() {
        let err = process("{models: {names: [{alias: '', type: App\\Foo}]}}").unwrap_err();
        assert_eq!(err.path(), Some("nelmio_api_doc.models.names.0.alias"));
    }

    #[test]
    fn test_documentation_must_be_a_mapping() {
        let err = process("{documentation: [info]}").unwrap_err();
        assert_eq!(err.path(), Some("nelmio_api_doc.documentation"));
        assert!(err.to_string().contains("Expected \"mapping\", but got \"sequence\"."));
    }
}
