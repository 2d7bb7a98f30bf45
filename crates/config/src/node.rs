//! Schema node definitions
//!
//! A schema is a tree of [`Node`]s. Each node carries a kind tag, an optional
//! default, an optional before-normalization hook and a list of validation
//! rules that run once the node and all of its children have been finalized.

use serde_yaml::{Mapping, Value};

/// A validation rule body. Returns the violation message when the rule fails.
pub type RuleFn = fn(&Value) -> Option<String>;

/// Rewrites a raw value before it is type checked.
pub type BeforeFn = fn(Value) -> Value;

/// Which error class a failing rule is reported as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    TypeMismatch,
    Enum,
    CrossField,
    MissingKey,
}

/// A validation rule attached to a node
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: RuleKind,
    pub check: RuleFn,
}

/// Primitive type of a scalar leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// Strict boolean
    Bool,
    /// String; integers, floats and booleans are coerced to their textual form
    String,
}

/// Shape of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Scalar leaf of a primitive type
    Scalar(ScalarType),
    /// String leaf restricted to a fixed set of identifiers
    Enum(&'static [&'static str]),
    /// Any value, passed through untouched
    Variable,
    /// Free-form mapping whose contents are not checked
    Document,
    /// Ordered sequence of prototype values
    List(Box<Node>),
    /// Mapping from names to prototype values; a sequence of mappings carrying
    /// `key_attribute` is accepted and converted
    Keyed {
        key_attribute: &'static str,
        prototype: Box<Node>,
    },
    /// Mapping with a fixed set of named children
    Struct(Vec<Node>),
}

/// A node of the configuration schema
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub default: Option<Value>,
    pub required: bool,
    pub nullable: bool,
    pub not_empty: bool,
    pub before: Option<BeforeFn>,
    pub rules: Vec<Rule>,
    pub info: Option<&'static str>,
}

impl Node {
    fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            required: false,
            nullable: false,
            not_empty: false,
            before: None,
            rules: Vec::new(),
            info: None,
        }
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, NodeKind::Scalar(ScalarType::Bool))
    }

    pub fn scalar(name: &str) -> Self {
        Self::new(name, NodeKind::Scalar(ScalarType::String))
    }

    pub fn enumeration(name: &str, values: &'static [&'static str]) -> Self {
        Self::new(name, NodeKind::Enum(values))
    }

    pub fn variable(name: &str) -> Self {
        Self::new(name, NodeKind::Variable)
    }

    pub fn document(name: &str) -> Self {
        Self::new(name, NodeKind::Document)
    }

    pub fn list(name: &str, prototype: Node) -> Self {
        Self::new(name, NodeKind::List(Box::new(prototype)))
    }

    /// A list of strings, the most common list shape
    pub fn string_list(name: &str) -> Self {
        Self::list(name, Self::scalar(""))
    }

    pub fn keyed(name: &str, key_attribute: &'static str, prototype: Node) -> Self {
        Self::new(
            name,
            NodeKind::Keyed {
                key_attribute,
                prototype: Box::new(prototype),
            },
        )
    }

    pub fn structure(name: &str, children: Vec<Node>) -> Self {
        Self::new(name, NodeKind::Struct(children))
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Defaults to null and accepts an explicit null
    pub fn default_null(mut self) -> Self {
        self.default = Some(Value::Null);
        self.nullable = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    pub fn before(mut self, hook: BeforeFn) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn validate(mut self, kind: RuleKind, check: RuleFn) -> Self {
        self.rules.push(Rule { kind, check });
        self
    }

    pub fn info(mut self, info: &'static str) -> Self {
        self.info = Some(info);
        self
    }

    /// Named child of a struct node
    pub fn child(&self, name: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Struct(children) => children.iter().find(|c| c.name == name),
            _ => None,
        }
    }

    /// Every leaf below this node with its dotted path, in declaration order.
    /// Prototypes contribute a `*` segment.
    pub fn leaves(&self) -> Vec<(String, &Node)> {
        let mut out = Vec::new();
        self.collect_leaves(&self.name, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, path: &str, out: &mut Vec<(String, &'a Node)>) {
        match &self.kind {
            NodeKind::Struct(children) => {
                for child in children {
                    child.collect_leaves(&format!("{}.{}", path, child.name), out);
                }
            }
            NodeKind::Keyed { prototype, .. } => prototype.collect_leaves(&format!("{}.*", path), out),
            NodeKind::List(prototype) if matches!(prototype.kind, NodeKind::Struct(_)) => {
                prototype.collect_leaves(&format!("{}.*", path), out)
            }
            _ => out.push((path.to_string(), self)),
        }
    }

    /// Value used when the node is absent from every fragment.
    ///
    /// Struct nodes without an explicit default collect the defaults of their
    /// children; collections default to empty. Scalars have no implicit default.
    pub fn implicit_default(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match &self.kind {
            NodeKind::Struct(children) => {
                let mut map = Mapping::new();
                for child in children {
                    if let Some(value) = child.implicit_default() {
                        map.insert(Value::String(child.name.clone()), value);
                    }
                }
                Some(Value::Mapping(map))
            }
            NodeKind::List(_) => Some(Value::Sequence(Vec::new())),
            NodeKind::Keyed { .. } | NodeKind::Document => Some(Value::Mapping(Mapping::new())),
            NodeKind::Scalar(_) | NodeKind::Enum(_) | NodeKind::Variable => None,
        }
    }
}
