//! Attribute meta information - per node kind, per attribute name.
//!
//! Meta info supplies the default value an attribute takes when no local
//! override is present. Unknown attributes get an empty meta entry (no
//! default).

use std::collections::BTreeMap;
use std::path::Path as FsPath;

use anyhow::{Context, Result};
use model_types::NodeKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Meta information of a single attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetaInfo {
    pub id: String,
    #[serde(default)]
    pub default_value: Option<Value>,
}

impl ModelMetaInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value).filter(|v| !v.is_null());
        self
    }
}

/// Meta information for all attributes, grouped by the kind of node that
/// owns them.
///
/// YAML form:
///
/// ```yaml
/// field:
///   order:
///     defaultValue: 0
///   displayType:
///     defaultValue: EDITABLE
/// region:
///   order: {}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelsMetaInfo {
    by_kind: BTreeMap<NodeKind, BTreeMap<String, MetaEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaEntry {
    #[serde(default)]
    default_value: Option<Value>,
}

impl ModelsMetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register meta info for an attribute owned by nodes of `owner`.
    pub fn insert(&mut self, owner: NodeKind, meta: ModelMetaInfo) {
        self.by_kind.entry(owner).or_default().insert(
            meta.id,
            MetaEntry {
                default_value: meta.default_value,
            },
        );
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, owner: NodeKind, meta: ModelMetaInfo) -> Self {
        self.insert(owner, meta);
        self
    }

    /// Meta info for `name` on a node of kind `owner`.
    pub fn attribute(&self, owner: NodeKind, name: &str) -> ModelMetaInfo {
        let default_value = self
            .by_kind
            .get(&owner)
            .and_then(|attrs| attrs.get(name))
            .and_then(|entry| entry.default_value.clone());
        ModelMetaInfo {
            id: name.to_string(),
            default_value,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse attribute meta info")
    }

    /// Load meta info from a YAML file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read meta info file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid meta info file: {}", path.display()))
    }
}
