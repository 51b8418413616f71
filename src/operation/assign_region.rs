use model_types::{operation_names, ModelChangeSet, ModelChangeSetInfo, NodeKind, PathStep};
use serde_json::Value;

use super::{check_collision, ModelChangeSetOperation};
use crate::error::{ModelChangeError, Result};
use crate::model::{Models, ResolvedNode};

/// Attribute name reported in collisions on a field's region.
const REGION_ID: &str = "regionId";

/// Moves a field into a region (`newValue` is the region id) or out of any
/// region (`newValue` is null).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssignToRegionOperation;

fn region_id(change: &ModelChangeSet) -> Result<Option<&str>> {
    match &change.new_value {
        None => Ok(None),
        Some(Value::String(id)) if !id.is_empty() => PathStep::check_value(id)
            .map(|()| Some(id.as_str()))
            .map_err(|err| ModelChangeError::invalid_change(&change.path, err.to_string())),
        Some(other) => Err(ModelChangeError::invalid_change(
            &change.path,
            format!("region id must be a non-empty string, got {other}"),
        )),
    }
}

impl ModelChangeSetOperation for AssignToRegionOperation {
    fn name(&self) -> &'static str {
        operation_names::ASSIGN_TO_REGION
    }

    fn accepted_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Field]
    }

    fn validate(
        &self,
        _models: &Models,
        target: &ResolvedNode<'_>,
        info: &ModelChangeSetInfo,
    ) -> Result<bool> {
        let incoming = region_id(&info.change_set)?;
        let stored = target
            .field()
            .and_then(|field| field.region_id())
            .map(|id| Value::String(id.to_string()));
        check_collision(target.path(), REGION_ID, stored.as_ref(), info)?;
        Ok(stored.as_ref().and_then(Value::as_str) != incoming)
    }

    fn apply_change(
        &self,
        models: &mut Models,
        change: &ModelChangeSet,
    ) -> Result<Vec<ModelChangeSet>> {
        let region = region_id(change)?.map(str::to_string);
        models
            .assign_field_region(&change.path, region)
            .ok_or_else(|| ModelChangeError::unresolved(&change.path))?;
        Ok(Vec::new())
    }
}
