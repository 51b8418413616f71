//! Overridable model nodes and the capability they share.
//!
//! A node below a definition exists only while it carries a local override.
//! Creation and removal go through the owning `ModelDefinition`; nodes never
//! hold back-references, their owning context is derived from their path.

use indexmap::IndexMap;
use model_types::{NodeKind, Path};
use serde_json::Value;

use super::meta::ModelMetaInfo;

/// Attributes set directly on a node, in insertion order.
pub type AttributeMap = IndexMap<String, ModelAttribute>;

/// Capability shared by every addressable node.
pub trait ModelNode {
    /// The node's own identifier (the value of its path tail).
    fn id(&self) -> &str;

    fn kind(&self) -> NodeKind;

    fn path(&self) -> &Path;

    /// Path of the owning context, `None` for definitions.
    fn context_path(&self) -> Option<Path> {
        self.path().cut_off_tail()
    }

    /// Attribute set directly on this node.
    fn attribute(&self, _name: &str) -> Option<&ModelAttribute> {
        None
    }

    /// Names of the attributes set directly on this node, copied out so the
    /// caller may mutate the node while walking them.
    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn has_attributes(&self) -> bool {
        !self.attribute_names().is_empty()
    }
}

// ── Attribute ─────────────────────────────────────────────────

/// A single attribute value on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAttribute {
    name: String,
    path: Path,
    value: Option<Value>,
    meta_info: ModelMetaInfo,
}

impl ModelAttribute {
    pub fn new(owner: &Path, name: impl Into<String>, meta_info: ModelMetaInfo) -> Self {
        let name = name.into();
        Self {
            path: owner.attribute(name.clone()),
            name,
            value: None,
            meta_info,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The locally stored value, if any.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value.filter(|v| !v.is_null());
    }

    pub fn meta_info(&self) -> &ModelMetaInfo {
        &self.meta_info
    }

    /// Stored value, or the meta default when nothing is stored.
    pub fn effective_value(&self) -> Option<&Value> {
        self.value
            .as_ref()
            .or(self.meta_info.default_value.as_ref())
    }
}

impl ModelNode for ModelAttribute {
    fn id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Attribute
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

// ── Generic element (region, header, action, action group) ────

/// An overridable node that is nothing but an id and its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelElement {
    id: String,
    kind: NodeKind,
    path: Path,
    attributes: AttributeMap,
}

/// Region node. Fields join a region through their `region_id`.
pub type ModelRegion = ModelElement;
/// Action node, keyed by action id in the definition's actions map.
pub type ModelAction = ModelElement;
pub type ModelHeader = ModelElement;
pub type ModelActionGroup = ModelElement;

impl ModelElement {
    pub(crate) fn new(definition: &Path, kind: NodeKind, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: definition.child(kind, id.clone()),
            id,
            kind,
            attributes: AttributeMap::new(),
        }
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

impl ModelNode for ModelElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn attribute(&self, name: &str) -> Option<&ModelAttribute> {
        self.attributes.get(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

// ── Field ─────────────────────────────────────────────────────

/// A field of a definition. A field is in a region iff its `region_id`
/// equals the region's id.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    id: String,
    path: Path,
    region_id: Option<String>,
    attributes: AttributeMap,
}

impl ModelField {
    pub(crate) fn new(definition: &Path, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: definition.child(NodeKind::Field, id.clone()),
            id,
            region_id: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn region_id(&self) -> Option<&str> {
        self.region_id.as_deref()
    }

    pub fn set_region_id(&mut self, region_id: Option<String>) {
        self.region_id = region_id;
    }

    pub fn is_in_region(&self, region_id: &str) -> bool {
        self.region_id.as_deref() == Some(region_id)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

impl ModelNode for ModelField {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Field
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn attribute(&self, name: &str) -> Option<&ModelAttribute> {
        self.attributes.get(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_value_falls_back_to_default() {
        let owner = Path::definition("D").child(NodeKind::Field, "f");
        let meta = ModelMetaInfo::new("order").with_default(json!(5));
        let mut attribute = ModelAttribute::new(&owner, "order", meta);
        assert_eq!(attribute.value(), None);
        assert_eq!(attribute.effective_value(), Some(&json!(5)));

        attribute.set_value(Some(json!(10)));
        assert_eq!(attribute.effective_value(), Some(&json!(10)));

        attribute.set_value(Some(Value::Null));
        assert_eq!(attribute.value(), None);
    }

    #[test]
    fn test_attribute_path_and_context() {
        let owner = Path::definition("D").child(NodeKind::Action, "lock");
        let attribute = ModelAttribute::new(&owner, "order", ModelMetaInfo::new("order"));
        assert_eq!(attribute.path().to_string(), "definition=D/action=lock/attribute=order");
        assert_eq!(attribute.context_path(), Some(owner));
        assert!(!attribute.has_attributes());
    }

    #[test]
    fn test_attribute_names_is_a_snapshot() {
        let definition = Path::definition("D");
        let mut region = ModelElement::new(&definition, NodeKind::Region, "R1");
        for name in ["order", "label"] {
            let attr = ModelAttribute::new(region.path(), name, ModelMetaInfo::new(name));
            region.attributes_mut().insert(name.to_string(), attr);
        }
        let names = region.attribute_names();
        for name in &names {
            region.attributes_mut().shift_remove(name);
        }
        assert_eq!(names, vec!["order".to_string(), "label".to_string()]);
        assert!(!region.has_attributes());
    }

    #[test]
    fn test_field_region_membership() {
        let mut field = ModelField::new(&Path::definition("D"), "A");
        assert!(!field.is_in_region("R1"));
        field.set_region_id(Some("R1".into()));
        assert!(field.is_in_region("R1"));
        assert_eq!(field.path().to_string(), "definition=D/field=A");
    }
}
