//! Package descriptors.
//!
//! A descriptor is the key/value metadata block that ships with a
//! distributable package: either the keyword arguments of a `setup(...)`
//! call, a flat `key='value'` listing, or the core metadata file
//! (`PKG-INFO` / `METADATA`) of a built distribution.

mod error;
mod lint;
mod metadata;
mod reader;
mod writer;

use serde::{Deserialize, Serialize};

pub use error::DescriptorError;
pub use lint::{Finding, Severity, lint};
pub use metadata::parse_core_metadata;
pub use reader::{parse_descriptor, parse_descriptor_bytes};
pub use writer::{render_descriptor, render_setup_py};

/// Version assumed when a descriptor does not declare one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Metadata describing one distributable package.
///
/// Every field except `name` has a default, so partially filled descriptors
/// are valid values. Lists keep the order they were written in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Descriptor {
    /// `None` for anonymous descriptors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: String,
    pub author: String,
    pub author_email: String,
    pub license: String,
    pub description: String,
    pub url: String,
    pub packages: Vec<String>,
    pub install_requires: Vec<String>,
    pub entry_points: Vec<EntryPointGroup>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Descriptor {
            name: None,
            version: DEFAULT_VERSION.to_string(),
            author: String::new(),
            author_email: String::new(),
            license: String::new(),
            description: String::new(),
            url: String::new(),
            packages: Vec::new(),
            install_requires: Vec::new(),
            entry_points: Vec::new(),
        }
    }
}

impl Descriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Descriptor {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Name for display, `(anonymous)` when unset.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }

    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One `entry_points` group, e.g. `console_scripts`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EntryPointGroup {
    pub group: String,
    /// Raw `name = module:attr` specifications, in declaration order.
    pub entries: Vec<String>,
}

impl EntryPointGroup {
    /// Split entries into `(name, target)` pairs, skipping ones without `=`.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| {
            let (name, target) = entry.split_once('=')?;
            Some((name.trim(), target.trim()))
        })
    }
}
