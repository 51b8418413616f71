use model_types::{operation_names, ModelChangeSet, ModelChangeSetInfo, NodeKind};

use super::{check_collision, ModelChangeSetOperation};
use crate::error::{ModelChangeError, Result};
use crate::model::{Models, ResolvedNode};

/// Writes an attribute override. A `null` new value clears the override by
/// delegating to `restore`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifyAttributeOperation;

impl ModelChangeSetOperation for ModifyAttributeOperation {
    fn name(&self) -> &'static str {
        operation_names::MODIFY_ATTRIBUTE
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Attribute]
    }

    fn validate(
        &self,
        _models: &Models,
        target: &ResolvedNode<'_>,
        info: &ModelChangeSetInfo,
    ) -> Result<bool> {
        let stored = target.attribute().and_then(|attribute| attribute.value());
        check_collision(target.path(), target.path().value(), stored, info)?;
        Ok(info.change_set.new_value.as_ref() != stored)
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        let Some(value) = change.new_value.clone() else {
            return Ok(vec![ModelChangeSet::restore(change.path.clone())]);
        };
        models
            .write_attribute(&change.path, value)
            .ok_or_else(|| ModelChangeError::unresolved(&change.path))?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDefinition;
    use model_types::Path;
    use serde_json::{json, Value};

    fn order_path() -> Path {
        Path::parse("definition=D/field=f/attribute=order").unwrap()
    }

    fn models_with_order(value: Option<Value>) -> Models {
        let mut models = Models::default().with_definition(ModelDefinition::new("D"));
        if let Some(value) = value {
            models.write_attribute(&order_path(), value).unwrap();
        }
        models
    }

    fn validate(models: &Models, change: ModelChangeSet) -> Result<bool> {
        let target = models.resolve(&change.path).unwrap();
        let info = ModelChangeSetInfo::new(change, NodeKind::Attribute, false);
        ModifyAttributeOperation.validate(models, &target, &info)
    }

    #[test]
    fn test_validate_detects_no_op() {
        let models = models_with_order(Some(json!(10)));
        assert!(!validate(&models, ModelChangeSet::modify_attribute(order_path(), json!(5), json!(10))).unwrap());
        assert!(validate(&models, ModelChangeSet::modify_attribute(order_path(), json!(10), json!(20))).unwrap());
    }

    #[test]
    fn test_validate_collision() {
        let models = models_with_order(Some(json!(30)));
        let err = validate(&models, ModelChangeSet::modify_attribute(order_path(), json!(10), json!(50)))
            .unwrap_err();
        assert!(err.is_collision());
    }

    #[test]
    fn test_validate_without_stored_value_never_collides() {
        let models = models_with_order(None);
        assert!(validate(&models, ModelChangeSet::modify_attribute(order_path(), json!(1), json!(2))).unwrap());
        assert!(!validate(&models, ModelChangeSet::modify_attribute(order_path(), json!(1), Value::Null)).unwrap());
    }

    #[test]
    fn test_apply_writes_value() {
        let mut models = models_with_order(None);
        let change = ModelChangeSet::modify_attribute(order_path(), Value::Null, json!(7));
        assert!(ModifyAttributeOperation.apply_change(&mut models, &change).unwrap().is_empty());
        let field = models.definition("D").unwrap().field("f").unwrap();
        assert_eq!(field.attributes()["order"].value(), Some(&json!(7)));
    }

    #[test]
    fn test_apply_null_delegates_to_restore() {
        let mut models = models_with_order(Some(json!(10)));
        let change = ModelChangeSet::modify_attribute(order_path(), json!(10), Value::Null);
        let follow_ups = ModifyAttributeOperation.apply_change(&mut models, &change).unwrap();
        assert_eq!(follow_ups, vec![ModelChangeSet::restore(order_path())]);
        assert!(models.definition("D").unwrap().field("f").is_some());
    }
}
