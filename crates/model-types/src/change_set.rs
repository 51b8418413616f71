//! Change-set value types - requests to edit a model and the resolved units
//! of work an engine reports back.
//!
//! Wire names are camelCase to match the model update API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node_kind::NodeKind;
use crate::path::Path;

/// Operation names of the built-in operations.
pub mod operation_names {
    pub const MODIFY_ATTRIBUTE: &str = "modifyAttribute";
    pub const RESTORE: &str = "restore";
    pub const REMOVE_NODE: &str = "removeNode";
    pub const ASSIGN_TO_REGION: &str = "assignToRegion";
}

/// An immutable edit request: apply `operation` to the node at `path`,
/// assuming it currently holds `old_value`, so that it ends up as `new_value`.
///
/// `None` stands for a JSON `null` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChangeSet {
    pub path: Path,
    pub operation: String,
    #[serde(default, deserialize_with = "null_as_none")]
    pub old_value: Option<Value>,
    #[serde(default, deserialize_with = "null_as_none")]
    pub new_value: Option<Value>,
}

impl ModelChangeSet {
    pub fn new(path: Path, operation: impl Into<String>) -> Self {
        Self {
            path,
            operation: operation.into(),
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_old_value(mut self, value: impl Into<Option<Value>>) -> Self {
        self.old_value = normalize(value.into());
        self
    }

    pub fn with_new_value(mut self, value: impl Into<Option<Value>>) -> Self {
        self.new_value = normalize(value.into());
        self
    }

    /// `modifyAttribute` request for the attribute at `path`.
    pub fn modify_attribute(
        path: Path,
        old_value: impl Into<Option<Value>>,
        new_value: impl Into<Option<Value>>,
    ) -> Self {
        Self::new(path, operation_names::MODIFY_ATTRIBUTE)
            .with_old_value(old_value)
            .with_new_value(new_value)
    }

    /// `restore` request for the node or attribute at `path`.
    pub fn restore(path: Path) -> Self {
        Self::new(path, operation_names::RESTORE)
    }

    /// `removeNode` request for the node at `path`.
    pub fn remove_node(path: Path) -> Self {
        Self::new(path, operation_names::REMOVE_NODE)
    }

    /// `assignToRegion` request moving the field at `path` to `region_id`
    /// (`None` unassigns it).
    pub fn assign_to_region(path: Path, region_id: Option<&str>) -> Self {
        Self::new(path, operation_names::ASSIGN_TO_REGION)
            .with_new_value(region_id.map(|id| Value::String(id.to_string())))
    }
}

fn normalize(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

fn null_as_none<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(normalize(Option::<Value>::deserialize(deserializer)?))
}

/// A change-set bound to the operation that executed it.
///
/// Intermediate entries were synthesized by cascading rather than submitted
/// by the caller; they carry no caller expectation and are never
/// collision-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChangeSetInfo {
    pub change_set: ModelChangeSet,
    /// Name of the resolved operation.
    pub operation: String,
    /// Kind of node the operation was dispatched on.
    pub node_kind: NodeKind,
    pub intermediate: bool,
}

impl ModelChangeSetInfo {
    pub fn new(change_set: ModelChangeSet, node_kind: NodeKind, intermediate: bool) -> Self {
        Self {
            operation: change_set.operation.clone(),
            change_set,
            node_kind,
            intermediate,
        }
    }

    pub fn path(&self) -> &Path {
        &self.change_set.path
    }
}

/// A batch of changes submitted against a known model version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdateRequest {
    /// Version the caller last observed.
    #[serde(default)]
    pub model_version: u64,
    #[serde(default)]
    pub changes: Vec<ModelChangeSet>,
}

impl ModelUpdateRequest {
    pub fn new(model_version: u64, changes: Vec<ModelChangeSet>) -> Self {
        Self {
            model_version,
            changes,
        }
    }
}

/// Outcome of an update: the current version and every change newer than the
/// version in the request, in application order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdateResponse {
    pub model_version: u64,
    pub change_sets: Vec<ModelChangeSetInfo>,
}
