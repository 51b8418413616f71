use model_types::{operation_names, ModelChangeSet, ModelChangeSetInfo, NodeKind};

use super::ModelChangeSetOperation;
use crate::error::{ModelChangeError, Result};
use crate::model::{Models, ResolvedNode};

/// Drops a child node override from its definition. Absent nodes are a no-op.
///
/// A region is only removed once no field of its definition is assigned to
/// it; `restore` on the region unassigns them first.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveNodeOperation;

impl ModelChangeSetOperation for RemoveNodeOperation {
    fn name(&self) -> &'static str {
        operation_names::REMOVE_NODE
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Field,
            NodeKind::Region,
            NodeKind::Header,
            NodeKind::Action,
            NodeKind::ActionGroup,
        ]
    }

    fn validate(
        &self,
        models: &Models,
        target: &ResolvedNode<'_>,
        _: &ModelChangeSetInfo,
    ) -> Result<bool> {
        if !target.exists() {
            return Ok(false);
        }
        if target.kind() == NodeKind::Region {
            let assigned = models
                .definition(&target.path().head().value)
                .map(|definition| definition.fields_in_region(target.path().value()))
                .unwrap_or_default();
            if !assigned.is_empty() {
                return Err(ModelChangeError::invalid_change(
                    target.path(),
                    format!("region still has {} assigned field(s)", assigned.len()),
                ));
            }
        }
        Ok(true)
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        if !models.remove_node(&change.path) {
            tracing::debug!(path = %change.path, "node already absent");
        }
        Ok(Vec::new())
    }
}
