//! The `restore` family: collapse an override back to its inherited baseline.
//!
//! Node restores never mutate directly. They expand into one `restore` per
//! attribute set on the node, then a `removeNode` for the node itself; region
//! restores first unassign every field that still points at the region.

use model_types::{operation_names, ModelChangeSet, ModelChangeSetInfo, NodeKind, Path};

use super::{is_vacant, ModelChangeSetOperation};
use crate::error::{ModelChangeError, Result};
use crate::model::{ModelNode, ModelNodeRef, Models, ResolvedNode};

/// Follow-ups that drain `node`: a `restore` per attribute, then `removeNode`.
///
/// Attribute names are copied out first; the restores they produce mutate
/// the same attribute map.
pub fn restore_model_node_attributes(node: &dyn ModelNode) -> Vec<ModelChangeSet> {
    node.attribute_names()
        .into_iter()
        .map(|name| ModelChangeSet::restore(node.path().attribute(name)))
        .chain(std::iter::once(ModelChangeSet::remove_node(node.path().clone())))
        .collect()
}

fn resolve_node<'a>(models: &'a Models, path: &Path) -> Result<Option<&'a dyn ModelNode>> {
    let resolved = models
        .resolve(path)
        .ok_or_else(|| ModelChangeError::unresolved(path))?;
    Ok(resolved.node().map(|node| node.as_node()))
}

// ── Attribute ─────────────────────────────────────────────────

/// Removes an attribute override. A field, region, header, action or action
/// group left with nothing overridden is removed too.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestoreAttributeOperation;

impl ModelChangeSetOperation for RestoreAttributeOperation {
    fn name(&self) -> &'static str {
        operation_names::RESTORE
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Attribute]
    }

    fn validate(&self, _: &Models, target: &ResolvedNode<'_>, _: &ModelChangeSetInfo) -> Result<bool> {
        Ok(target.exists())
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        if models.remove_attribute(&change.path).is_none() {
            return Ok(Vec::new());
        }
        let Some(owner_path) = change.path.cut_off_tail() else {
            return Ok(Vec::new());
        };
        if owner_path.kind() == NodeKind::Definition {
            return Ok(Vec::new());
        }

        let resolved = models
            .resolve(&owner_path)
            .ok_or_else(|| ModelChangeError::unresolved(&owner_path))?;
        let vacant = match resolved.node() {
            Some(ModelNodeRef::Field(field)) => is_vacant(field, field.region_id().is_some()),
            Some(node) if owner_path.kind() == NodeKind::Region => {
                let assigned = models
                    .definition(&owner_path.head().value)
                    .is_some_and(|definition| !definition.fields_in_region(owner_path.value()).is_empty());
                is_vacant(node.as_node(), assigned)
            }
            Some(node) => is_vacant(node.as_node(), false),
            None => false,
        };
        if vacant {
            Ok(vec![ModelChangeSet::remove_node(owner_path)])
        } else {
            Ok(Vec::new())
        }
    }
}

// ── Field, header, action, action group ───────────────────────

/// Restores a whole node through the attribute-restore-and-remove sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestoreNodeOperation;

impl ModelChangeSetOperation for RestoreNodeOperation {
    fn name(&self) -> &'static str {
        operation_names::RESTORE
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Field,
            NodeKind::Header,
            NodeKind::Action,
            NodeKind::ActionGroup,
        ]
    }

    fn validate(&self, _: &Models, target: &ResolvedNode<'_>, _: &ModelChangeSetInfo) -> Result<bool> {
        Ok(target.exists())
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        Ok(resolve_node(models, &change.path)?
            .map(restore_model_node_attributes)
            .unwrap_or_default())
    }
}

// ── Region ────────────────────────────────────────────────────

/// Unassigns the region's fields, then drains and removes the region.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestoreRegionOperation;

impl ModelChangeSetOperation for RestoreRegionOperation {
    fn name(&self) -> &'static str {
        operation_names::RESTORE
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Region]
    }

    fn validate(&self, _: &Models, target: &ResolvedNode<'_>, _: &ModelChangeSetInfo) -> Result<bool> {
        Ok(target.exists())
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        let Some(region) = resolve_node(models, &change.path)? else {
            return Ok(Vec::new());
        };
        let definition_id = change.path.head().value.as_str();
        let fields = models
            .definition(definition_id)
            .map(|definition| definition.fields_in_region(region.id()))
            .unwrap_or_default();

        let mut follow_ups: Vec<ModelChangeSet> = fields
            .into_iter()
            .map(|field| ModelChangeSet::assign_to_region(field, None))
            .collect();
        follow_ups.extend(restore_model_node_attributes(region));
        Ok(follow_ups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDefinition;
    use serde_json::json;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn models() -> Models {
        let mut models = Models::default().with_definition(ModelDefinition::new("D"));
        for (p, v) in [
            ("definition=D/region=R1/attribute=order", json!(1)),
            ("definition=D/region=R1/attribute=label", json!("Relations")),
            ("definition=D/action=lock/attribute=label", json!("Lock")),
            ("definition=D/attribute=label", json!("Def")),
        ] {
            models.write_attribute(&path(p), v).unwrap();
        }
        for field in ["A", "C"] {
            models
                .assign_field_region(&path(&format!("definition=D/field={field}")), Some("R1".into()))
                .unwrap();
        }
        models
            .assign_field_region(&path("definition=D/field=B"), Some("R2".into()))
            .unwrap();
        models
    }

    #[test]
    fn test_node_attribute_sequence_order() {
        let models = models();
        let region = models.definition("D").unwrap().region("R1").unwrap();
        let follow_ups = restore_model_node_attributes(region);
        assert_eq!(
            follow_ups,
            vec![
                ModelChangeSet::restore(path("definition=D/region=R1/attribute=order")),
                ModelChangeSet::restore(path("definition=D/region=R1/attribute=label")),
                ModelChangeSet::remove_node(path("definition=D/region=R1")),
            ]
        );
    }

    #[test]
    fn test_region_unassigns_fields_first() {
        let mut models = models();
        let follow_ups = RestoreRegionOperation
            .apply_change(&mut models, &ModelChangeSet::restore(path("definition=D/region=R1")))
            .unwrap();
        let operations: Vec<(&str, String)> = follow_ups
            .iter()
            .map(|c| (c.operation.as_str(), c.path.to_string()))
            .collect();
        assert_eq!(
            operations,
            vec![
                ("assignToRegion", "definition=D/field=A".to_string()),
                ("assignToRegion", "definition=D/field=C".to_string()),
                ("restore", "definition=D/region=R1/attribute=order".to_string()),
                ("restore", "definition=D/region=R1/attribute=label".to_string()),
                ("removeNode", "definition=D/region=R1".to_string()),
            ]
        );
        assert!(follow_ups[0].new_value.is_none());
    }

    #[test]
    fn test_absent_node_restore_is_empty() {
        let mut models = models();
        let change = ModelChangeSet::restore(path("definition=D/action=missing"));
        assert!(RestoreNodeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        let target = models.resolve(&change.path).unwrap();
        let info = ModelChangeSetInfo::new(change.clone(), NodeKind::Action, false);
        assert!(!RestoreNodeOperation.validate(&models, &target, &info).unwrap());
    }

    #[test]
    fn test_last_attribute_restore_emits_owner_removal() {
        let mut models = models();
        let change = ModelChangeSet::restore(path("definition=D/action=lock/attribute=label"));
        let follow_ups = RestoreAttributeOperation.apply_change(&mut models, &change).unwrap();
        assert_eq!(
            follow_ups,
            vec![ModelChangeSet::remove_node(path("definition=D/action=lock"))]
        );
    }

    #[test]
    fn test_attribute_restore_keeps_non_vacant_owner() {
        let mut models = models();
        let change = ModelChangeSet::restore(path("definition=D/region=R1/attribute=order"));
        assert!(RestoreAttributeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        let region = models.definition("D").unwrap().region("R1").unwrap();
        assert_eq!(region.attribute_names(), vec!["label".to_string()]);
    }

    #[test]
    fn test_definition_attribute_restore_never_removes_definition() {
        let mut models = models();
        let change = ModelChangeSet::restore(path("definition=D/attribute=label"));
        assert!(RestoreAttributeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        assert!(models.definition("D").is_some());
    }

    #[test]
    fn test_field_in_region_is_not_vacant() {
        let mut models = models();
        models
            .write_attribute(&path("definition=D/field=A/attribute=order"), json!(3))
            .unwrap();
        let change = ModelChangeSet::restore(path("definition=D/field=A/attribute=order"));
        assert!(RestoreAttributeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        assert!(models.definition("D").unwrap().field("A").is_some());
    }

    #[test]
    fn test_region_with_members_is_not_vacant() {
        let mut models = models();
        for attribute in ["order", "label"] {
            let change = ModelChangeSet::restore(path(&format!("definition=D/region=R1/attribute={attribute}")));
            assert!(RestoreAttributeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        }
        let def = models.definition("D").unwrap();
        assert!(!def.region("R1").unwrap().has_attributes());
        assert_eq!(def.field("A").unwrap().region_id(), Some("R1"));
    }
}
