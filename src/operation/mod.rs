//! Change-set operations.
//!
//! An operation is a named strategy scoped to the node kinds it accepts. The
//! engine resolves a change-set's path, looks the operation up by
//! `(name, kind)` in the [`OperationRegistry`], validates, then applies it and
//! queues whatever follow-up change-sets the operation returns.

mod assign_region;
mod modify_attribute;
mod registry;
mod remove_node;
mod restore;

use model_types::{ModelChangeSet, ModelChangeSetInfo, NodeKind, Path};
use serde_json::Value;

use crate::error::{ModelChangeError, Result};
use crate::model::{ModelNode, Models, ResolvedNode};

pub use assign_region::AssignToRegionOperation;
pub use modify_attribute::ModifyAttributeOperation;
pub use registry::OperationRegistry;
pub use remove_node::RemoveNodeOperation;
pub use restore::{
    restore_model_node_attributes, RestoreAttributeOperation, RestoreNodeOperation,
    RestoreRegionOperation,
};

/// Strategy that executes one kind of change-set.
pub trait ModelChangeSetOperation: Send + Sync {
    /// Operation name matched against `ModelChangeSet::operation`.
    fn name(&self) -> &'static str;

    /// Node kinds this operation is registered for.
    fn accepted_kinds(&self) -> &'static [NodeKind];

    fn is_accepted(&self, kind: NodeKind) -> bool {
        self.accepted_kinds().contains(&kind)
    }

    /// Check the change against the current tree.
    ///
    /// `Ok(false)` means the change is valid but has no effect. Collisions and
    /// malformed values are errors.
    fn validate(
        &self,
        models: &Models,
        target: &ResolvedNode<'_>,
        info: &ModelChangeSetInfo,
    ) -> Result<bool>;

    /// Mutate the tree and return the follow-up change-sets, in the order
    /// they must be applied.
    fn apply_change(&self, models: &mut Models, change: &ModelChangeSet)
        -> Result<Vec<ModelChangeSet>>;
}

// ── Shared helpers ────────────────────────────────────────────

/// Three-way collision rule.
///
/// Only applies when a value is stored locally and the change was submitted
/// by a caller. The edit is permitted when the current value equals either
/// the value the caller expected or the value it is writing.
pub(crate) fn check_collision(
    path: &Path,
    attribute: &str,
    current: Option<&Value>,
    info: &ModelChangeSetInfo,
) -> Result<()> {
    let Some(current) = current else {
        return Ok(());
    };
    if info.intermediate {
        return Ok(());
    }
    let change = &info.change_set;
    if change.old_value.as_ref() == Some(current) || change.new_value.as_ref() == Some(current) {
        return Ok(());
    }
    Err(ModelChangeError::Collision {
        node: node_id(path).to_string(),
        attribute: attribute.to_string(),
        current: Some(current.clone()),
        expected: change.old_value.clone(),
    })
}

/// Id of the node that owns the value at `path`: the owner for attributes,
/// the node itself otherwise.
fn node_id(path: &Path) -> &str {
    if path.kind() == NodeKind::Attribute {
        if let [.., owner, _] = path.steps() {
            return &owner.value;
        }
    }
    path.value()
}

/// Whether an override node carries nothing that differs from its baseline.
/// `linked` is set for a field assigned to a region and for a region that
/// still has fields assigned to it.
pub(crate) fn is_vacant(node: &dyn ModelNode, linked: bool) -> bool {
    !node.has_attributes() && !linked
}
