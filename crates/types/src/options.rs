//! Enumerated configuration options shared by the schema and its consumers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the documentation UI assets are served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetsMode {
    /// Assets referenced from a public CDN
    #[default]
    Cdn,
    /// Assets served from the bundle's public directory
    Bundle,
    /// Assets inlined into the rendered page
    Offline,
}

impl AssetsMode {
    /// Every accepted identifier, in declaration order
    pub const ALL: &'static [&'static str] = &["cdn", "bundle", "offline"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetsMode::Cdn => "cdn",
            AssetsMode::Bundle => "bundle",
            AssetsMode::Offline => "offline",
        }
    }
}

impl FromStr for AssetsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cdn" => Ok(AssetsMode::Cdn),
            "bundle" => Ok(AssetsMode::Bundle),
            "offline" => Ok(AssetsMode::Offline),
            other => Err(format!("Invalid assets mode \"{}\"", other)),
        }
    }
}

impl fmt::Display for AssetsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How operation ids are derived when the same route is documented in several areas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationIdGeneration {
    /// Always prefix the operation id with the HTTP method
    #[default]
    AlwaysPrepend,
    /// Prefix only when the route answers to more than one method
    ConditionallyPrepend,
    /// Use the route name unchanged
    NoPrepend,
}

impl OperationIdGeneration {
    pub const ALL: &'static [&'static str] =
        &["always_prepend", "conditionally_prepend", "no_prepend"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationIdGeneration::AlwaysPrepend => "always_prepend",
            OperationIdGeneration::ConditionallyPrepend => "conditionally_prepend",
            OperationIdGeneration::NoPrepend => "no_prepend",
        }
    }
}

impl fmt::Display for OperationIdGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
