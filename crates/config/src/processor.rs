//! Schema processor: normalizes raw fragments, merges them and finalizes the result

use crate::node::{Node, NodeKind, RuleKind, ScalarType};
use apidoc_types::utils::{display_value, join_path, key_to_string, quote_list, type_name};
use apidoc_types::{ConfigError, Result};
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

/// Walks raw configuration trees against a schema
pub struct Processor;

impl Processor {
    /// Process a list of fragments against `tree`.
    ///
    /// Fragments are normalized one by one, merged left to right and the merged
    /// tree is finalized: defaults are applied and validation rules run.
    pub fn process(tree: &Node, fragments: &[Value]) -> Result<Value> {
        let root = tree.name.as_str();
        let mut merged: Option<Value> = None;

        for (index, fragment) in fragments.iter().enumerate() {
            trace!(fragment = index, "Normalizing configuration fragment");
            let normalized = Self::normalize(tree, fragment.clone(), root)?;
            merged = Some(match merged {
                Some(left) => Self::merge(tree, left, normalized),
                None => normalized,
            });
        }

        let merged = merged.unwrap_or_else(|| Value::Mapping(Mapping::new()));
        let finalized = Self::finalize(tree, merged, root)?;
        debug!(fragments = fragments.len(), root, "Configuration processed");
        Ok(finalized)
    }

    /// Type check a single raw value and bring it into canonical shape
    pub fn normalize(node: &Node, value: Value, path: &str) -> Result<Value> {
        let value = match node.before {
            Some(hook) => hook(value),
            None => value,
        };

        match &node.kind {
            NodeKind::Scalar(scalar) => Self::normalize_scalar(node, *scalar, value, path),
            NodeKind::Enum(allowed) => Self::normalize_enum(node, allowed, value, path),
            NodeKind::Variable => Ok(value),
            NodeKind::Document => match value {
                Value::Null => Ok(Value::Mapping(Mapping::new())),
                Value::Mapping(map) => Ok(Value::Mapping(map)),
                other => Err(type_mismatch(path, "mapping", &other)),
            },
            NodeKind::List(prototype) => match value {
                Value::Null => Ok(Value::Sequence(Vec::new())),
                Value::Sequence(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        Self::normalize(prototype, item, &join_path(path, &index.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Sequence),
                other => Err(type_mismatch(path, "sequence", &other)),
            },
            NodeKind::Keyed {
                key_attribute,
                prototype,
            } => {
                let map = match value {
                    Value::Null => Mapping::new(),
                    Value::Mapping(map) => map,
                    Value::Sequence(items) => Self::key_by_attribute(items, key_attribute, path)?,
                    other => return Err(type_mismatch(path, "mapping", &other)),
                };
                let mut normalized = Mapping::with_capacity(map.len());
                for (key, item) in map {
                    let name = key_to_string(&key)
                        .ok_or_else(|| type_mismatch(path, "string key", &key))?;
                    let item = Self::normalize(prototype, item, &join_path(path, &name))?;
                    normalized.insert(Value::String(name), item);
                }
                Ok(Value::Mapping(normalized))
            }
            NodeKind::Struct(children) => {
                let map = match value {
                    Value::Null => Mapping::new(),
                    Value::Mapping(map) => map,
                    other => return Err(type_mismatch(path, "mapping", &other)),
                };
                let mut normalized = Mapping::with_capacity(map.len());
                for (key, item) in map {
                    let name = key_to_string(&key).unwrap_or_else(|| display_value(&key));
                    let child = children.iter().find(|c| c.name == name).ok_or_else(|| {
                        let available: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
                        ConfigError::UnrecognizedOption {
                            path: path.to_string(),
                            key: name.clone(),
                            available: quote_list(&available),
                        }
                    })?;
                    let item = Self::normalize(child, item, &join_path(path, &name))?;
                    normalized.insert(Value::String(name), item);
                }
                Ok(Value::Mapping(normalized))
            }
        }
    }

    /// Merge two normalized values; `right` takes precedence
    pub fn merge(node: &Node, left: Value, right: Value) -> Value {
        match (&node.kind, left, right) {
            (NodeKind::Struct(children), Value::Mapping(mut left), Value::Mapping(right)) => {
                for (key, value) in right {
                    let child = key.as_str().and_then(|name| children.iter().find(|c| c.name == name));
                    let merged = match (child, left.remove(&key)) {
                        (Some(child), Some(existing)) => Self::merge(child, existing, value),
                        _ => value,
                    };
                    left.insert(key, merged);
                }
                Value::Mapping(left)
            }
            (NodeKind::Keyed { prototype, .. }, Value::Mapping(mut left), Value::Mapping(right)) => {
                for (key, value) in right {
                    let merged = match left.remove(&key) {
                        Some(existing) => Self::merge(prototype, existing, value),
                        None => value,
                    };
                    left.insert(key, merged);
                }
                Value::Mapping(left)
            }
            (NodeKind::List(_), Value::Sequence(mut left), Value::Sequence(right)) => {
                left.extend(right);
                Value::Sequence(left)
            }
            (_, _, right) => right,
        }
    }

    /// Apply defaults, enforce required children and run validation rules
    pub fn finalize(node: &Node, value: Value, path: &str) -> Result<Value> {
        let value = match (&node.kind, value) {
            (NodeKind::Struct(children), Value::Mapping(mut map)) => {
                let mut finalized = Mapping::with_capacity(children.len());
                for child in children {
                    let key = Value::String(child.name.clone());
                    match map.remove(&key) {
                        Some(item) => {
                            let item = Self::finalize(child, item, &join_path(path, &child.name))?;
                            finalized.insert(key, item);
                        }
                        None if child.required => {
                            return Err(ConfigError::MissingRequiredKey {
                                path: path.to_string(),
                                message: format!(
                                    "The child config \"{}\" under \"{}\" must be configured.",
                                    child.name, path
                                ),
                            });
                        }
                        None => {
                            if let Some(default) = child.implicit_default() {
                                finalized.insert(key, default);
                            }
                        }
                    }
                }
                Value::Mapping(finalized)
            }
            (NodeKind::Keyed { prototype, .. }, Value::Mapping(map)) => {
                let mut finalized = Mapping::with_capacity(map.len());
                for (key, item) in map {
                    let name = key_to_string(&key).unwrap_or_default();
                    let item = Self::finalize(prototype, item, &join_path(path, &name))?;
                    finalized.insert(key, item);
                }
                Value::Mapping(finalized)
            }
            (NodeKind::List(prototype), Value::Sequence(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| Self::finalize(prototype, item, &join_path(path, &index.to_string())))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence)?,
            (_, value) => value,
        };

        for rule in &node.rules {
            if let Some(message) = (rule.check)(&value) {
                let path = path.to_string();
                return Err(match rule.kind {
                    RuleKind::TypeMismatch => ConfigError::TypeMismatch { path, message },
                    RuleKind::Enum => ConfigError::EnumViolation { path, message },
                    RuleKind::CrossField => ConfigError::CrossFieldViolation { path, message },
                    RuleKind::MissingKey => ConfigError::MissingRequiredKey { path, message },
                });
            }
        }

        Ok(value)
    }

    fn normalize_scalar(node: &Node, scalar: ScalarType, value: Value, path: &str) -> Result<Value> {
        let value = match (scalar, value) {
            (_, Value::Null) if node.nullable => return Ok(Value::Null),
            (_, Value::Null) => {
                return Err(ConfigError::TypeMismatch {
                    path: path.to_string(),
                    message: "The path cannot contain an empty value, but got null.".to_string(),
                })
            }
            (ScalarType::Bool, Value::Bool(b)) => Value::Bool(b),
            (ScalarType::Bool, other) => return Err(type_mismatch(path, "bool", &other)),
            (ScalarType::String, Value::String(s)) => Value::String(s),
            (ScalarType::String, Value::Number(n)) => Value::String(n.to_string()),
            (ScalarType::String, Value::Bool(b)) => Value::String(b.to_string()),
            (ScalarType::String, other) => return Err(type_mismatch(path, "scalar", &other)),
        };

        if node.not_empty && value.as_str() == Some("") {
            return Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                message: "The path cannot contain an empty value, but got \"\".".to_string(),
            });
        }
        Ok(value)
    }

    fn normalize_enum(node: &Node, allowed: &[&str], value: Value, path: &str) -> Result<Value> {
        if value.is_null() && node.nullable {
            return Ok(Value::Null);
        }
        let permitted = value.as_str().map_or(false, |s| allowed.contains(&s));
        if permitted {
            return Ok(value);
        }
        Err(ConfigError::EnumViolation {
            path: path.to_string(),
            message: format!(
                "The value \"{}\" is not allowed. Permissible values: {}.",
                display_value(&value),
                quote_list(allowed)
            ),
        })
    }

    /// Turn `[{name: a, ..}, {name: b, ..}]` into `{a: {..}, b: {..}}`
    fn key_by_attribute(items: Vec<Value>, attribute: &str, path: &str) -> Result<Mapping> {
        let mut map = Mapping::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let item_path = join_path(path, &index.to_string());
            let mut entry = match item {
                Value::Mapping(entry) => entry,
                other => return Err(type_mismatch(&item_path, "mapping", &other)),
            };
            let key = entry
                .remove(attribute)
                .as_ref()
                .and_then(key_to_string)
                .ok_or_else(|| ConfigError::MissingRequiredKey {
                    path: item_path.clone(),
                    message: format!("The attribute \"{}\" must be set.", attribute),
                })?;
            map.insert(Value::String(key), Value::Mapping(entry));
        }
        Ok(map)
    }
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        path: path.to_string(),
        message: format!("Expected \"{}\", but got \"{}\".", expected, type_name(actual)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> Value {
        serde_yaml::from_str(source).unwrap()
    }

    fn sample_tree() -> Node {
        Node::structure(
            "root",
            vec![
                Node::boolean("enabled").default_value(false),
                Node::scalar("name").default_value("anonymous"),
                Node::enumeration("mode", &["fast", "slow"]).default_value("fast"),
                Node::string_list("tags"),
                Node::keyed(
                    "servers",
                    "name",
                    Node::structure(
                        "",
                        vec![Node::scalar("host").required(), Node::scalar("port").default_value("80")],
                    ),
                ),
                Node::structure(
                    "limits",
                    vec![Node::scalar("low").default_null(), Node::scalar("high").default_null()],
                )
                .validate(RuleKind::CrossField, |value| {
                    (value["low"].is_null() && !value["high"].is_null())
                        .then(|| "high requires low".to_string())
                }),
            ],
        )
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        let value = Processor::process(&sample_tree(), &[]).unwrap();
        assert_eq!(
            value,
            yaml("{enabled: false, name: anonymous, mode: fast, tags: [], servers: {}, limits: {low: null, high: null}}")
        );
    }

    #[test]
    fn test_null_fragment_is_empty_mapping() {
        let from_null = Processor::process(&sample_tree(), &[Value::Null]).unwrap();
        let from_nothing = Processor::process(&sample_tree(), &[]).unwrap();
        assert_eq!(from_null, from_nothing);
    }

    #[test]
    fn test_string_scalars_are_coerced() {
        let value = Processor::process(&sample_tree(), &[yaml("{name: 42, tags: [1, true]}")]).unwrap();
        assert_eq!(value["name"], Value::from("42"));
        assert_eq!(value["tags"], yaml("['1', 'true']"));
    }

    #[test]
    fn test_boolean_is_strict() {
        let err = Processor::process(&sample_tree(), &[yaml("{enabled: 'yes'}")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                path: "root.enabled".to_string(),
                message: "Expected \"bool\", but got \"string\".".to_string(),
            }
        );
    }

    #[test]
    fn test_list_rejects_scalar() {
        let err = Processor::process(&sample_tree(), &[yaml("{tags: solo}")]).unwrap_err();
        assert!(err.to_string().contains("Expected \"sequence\", but got \"string\""));
        assert_eq!(err.path(), Some("root.tags"));
    }

    #[test]
    fn test_enum_rejects_unknown_value() {
        let err = Processor::process(&sample_tree(), &[yaml("{mode: medium}")]).unwrap_err();
        assert!(matches!(err, ConfigError::EnumViolation { .. }));
        assert!(err
            .to_string()
            .contains("The value \"medium\" is not allowed. Permissible values: \"fast\", \"slow\"."));
    }

    #[test]
    fn test_unrecognized_option() {
        let err = Processor::process(&sample_tree(), &[yaml("{colour: red}")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized option \"colour\" under \"root\". Available options are \"enabled\", \"name\", \"mode\", \"tags\", \"servers\", \"limits\"."
        );
    }

    #[test]
    fn test_required_child_must_be_configured() {
        let err = Processor::process(&sample_tree(), &[yaml("{servers: {web: {port: 8080}}}")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequiredKey {
                path: "root.servers.web".to_string(),
                message: "The child config \"host\" under \"root.servers.web\" must be configured.".to_string(),
            }
        );
    }

    #[test]
    fn test_keyed_list_is_converted() {
        let value = Processor::process(
            &sample_tree(),
            &[yaml("{servers: [{name: web, host: example.org}, {name: db, host: localhost, port: 5432}]}")],
        )
        .unwrap();
        assert_eq!(value["servers"]["web"], yaml("{host: example.org, port: '80'}"));
        assert_eq!(value["servers"]["db"], yaml("{host: localhost, port: '5432'}"));
    }

    #[test]
    fn test_keyed_list_requires_attribute() {
        let err = Processor::process(&sample_tree(), &[yaml("{servers: [{host: example.org}]}")]).unwrap_err();
        assert_eq!(err.path(), Some("root.servers.0"));
        assert!(err.to_string().contains("The attribute \"name\" must be set."));
    }

    #[test]
    fn test_cross_field_rule_sees_defaults() {
        let err = Processor::process(&sample_tree(), &[yaml("{limits: {high: '10'}}")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CrossFieldViolation {
                path: "root.limits".to_string(),
                message: "high requires low".to_string(),
            }
        );
    }

    #[test]
    fn test_fragments_merge_in_order() {
        let value = Processor::process(
            &sample_tree(),
            &[
                yaml("{name: first, tags: [a], servers: {web: {host: one}}}"),
                yaml("{name: second, tags: [b], servers: {web: {port: '81'}, db: {host: two}}}"),
            ],
        )
        .unwrap();
        assert_eq!(value["name"], Value::from("second"));
        assert_eq!(value["tags"], yaml("[a, b]"));
        assert_eq!(value["servers"]["web"], yaml("{host: one, port: '81'}"));
        assert_eq!(value["servers"]["db"], yaml("{host: two, port: '80'}"));
    }

    #[test]
    fn test_first_error_wins() {
        let err = Processor::process(&sample_tree(), &[yaml("{enabled: 1, mode: medium}")]).unwrap_err();
        assert_eq!(err.path(), Some("root.enabled"));
    }
}
