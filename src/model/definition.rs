//! ModelDefinition - a named, inheritable node owning the local override layer
//! of fields, regions, headers, actions and action groups.
//!
//! Inheritance itself is resolved elsewhere; a definition only keeps what is
//! overridden directly on it plus the id of the definition it inherits from.
//!
//! # Child lifetime
//!
//! A child override leaves the definition only through `removeNode`, either
//! submitted directly or emitted by a restore:
//!
//! - Restoring an attribute removes its owner once the owner is vacant: no
//!   attributes left and no region link. A field is linked while it is
//!   assigned to a region. A region is linked while any field points at it.
//! - Changing a field's region never removes the field. A field unassigned by
//!   `assignToRegion(field, null)` stays as an override with no region, so the
//!   unassignment remains visible. Restoring the field removes it.
//! - A region is never removed while a field is still assigned to it.

use indexmap::IndexMap;
use model_types::{NodeKind, Path};

use super::node::{AttributeMap, ModelAttribute, ModelElement, ModelField, ModelNode};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    id: String,
    path: Path,
    parent: Option<String>,
    attributes: AttributeMap,
    fields: IndexMap<String, ModelField>,
    regions: IndexMap<String, ModelElement>,
    headers: IndexMap<String, ModelElement>,
    actions: IndexMap<String, ModelElement>,
    action_groups: IndexMap<String, ModelElement>,
}

impl ModelDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: Path::definition(id.clone()),
            id,
            parent: None,
            attributes: AttributeMap::new(),
            fields: IndexMap::new(),
            regions: IndexMap::new(),
            headers: IndexMap::new(),
            actions: IndexMap::new(),
            action_groups: IndexMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Id of the definition this one inherits from.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn fields(&self) -> &IndexMap<String, ModelField> {
        &self.fields
    }

    pub fn regions(&self) -> &IndexMap<String, ModelElement> {
        &self.regions
    }

    pub fn headers(&self) -> &IndexMap<String, ModelElement> {
        &self.headers
    }

    pub fn actions(&self) -> &IndexMap<String, ModelElement> {
        &self.actions
    }

    pub fn action_groups(&self) -> &IndexMap<String, ModelElement> {
        &self.action_groups
    }

    pub fn field(&self, id: &str) -> Option<&ModelField> {
        self.fields.get(id)
    }

    pub fn region(&self, id: &str) -> Option<&ModelElement> {
        self.regions.get(id)
    }

    pub fn action(&self, id: &str) -> Option<&ModelElement> {
        self.actions.get(id)
    }

    /// Generic element (region, header, action, action group) by kind and id.
    pub fn element(&self, kind: NodeKind, id: &str) -> Option<&ModelElement> {
        self.element_store(kind).and_then(|store| store.get(id))
    }

    /// Any direct child (field or element) by kind and id.
    pub fn child(&self, kind: NodeKind, id: &str) -> Option<&dyn ModelNode> {
        match kind {
            NodeKind::Field => self.fields.get(id).map(|f| f as &dyn ModelNode),
            _ => self.element(kind, id).map(|e| e as &dyn ModelNode),
        }
    }

    pub fn contains_child(&self, kind: NodeKind, id: &str) -> bool {
        self.child(kind, id).is_some()
    }

    /// Paths of the fields assigned to `region_id`, copied out so the caller
    /// can reassign them while walking the list.
    pub fn fields_in_region(&self, region_id: &str) -> Vec<Path> {
        self.fields
            .values()
            .filter(|field| field.is_in_region(region_id))
            .map(|field| field.path().clone())
            .collect()
    }

    /// Field override, created empty when absent.
    pub fn get_or_create_field(&mut self, id: &str) -> &mut ModelField {
        let path = &self.path;
        self.fields
            .entry(id.to_string())
            .or_insert_with(|| ModelField::new(path, id))
    }

    pub(crate) fn field_mut(&mut self, id: &str) -> Option<&mut ModelField> {
        self.fields.get_mut(id)
    }

    /// Element override, created empty when absent. `None` if `kind` is not
    /// an element kind.
    pub fn get_or_create_element(&mut self, kind: NodeKind, id: &str) -> Option<&mut ModelElement> {
        let path = self.path.clone();
        let store = self.element_store_mut(kind)?;
        Some(
            store
                .entry(id.to_string())
                .or_insert_with(|| ModelElement::new(&path, kind, id)),
        )
    }

    /// Remove the local override of a child node. Returns whether anything
    /// was removed.
    pub fn remove_child(&mut self, kind: NodeKind, id: &str) -> bool {
        match kind {
            NodeKind::Field => self.fields.shift_remove(id).is_some(),
            _ => self
                .element_store_mut(kind)
                .and_then(|store| store.shift_remove(id))
                .is_some(),
        }
    }

    /// Attribute map of this definition (`child == None`) or of one of its
    /// children. With `create`, a missing child override is created first.
    pub(crate) fn attributes_of_mut(
        &mut self,
        child: Option<(NodeKind, &str)>,
        create: bool,
    ) -> Option<&mut AttributeMap> {
        let Some((kind, id)) = child else {
            return Some(&mut self.attributes);
        };
        match kind {
            NodeKind::Field if create => Some(self.get_or_create_field(id).attributes_mut()),
            NodeKind::Field => self.fields.get_mut(id).map(ModelField::attributes_mut),
            _ if create => self
                .get_or_create_element(kind, id)
                .map(ModelElement::attributes_mut),
            _ => self
                .element_store_mut(kind)
                .and_then(|store| store.get_mut(id))
                .map(ModelElement::attributes_mut),
        }
    }

    /// Set an attribute directly on this definition.
    pub fn set_attribute(&mut self, attribute: ModelAttribute) {
        self.attributes.insert(attribute.name().to_string(), attribute);
    }

    fn element_store(&self, kind: NodeKind) -> Option<&IndexMap<String, ModelElement>> {
        match kind {
            NodeKind::Region => Some(&self.regions),
            NodeKind::Header => Some(&self.headers),
            NodeKind::Action => Some(&self.actions),
            NodeKind::ActionGroup => Some(&self.action_groups),
            _ => None,
        }
    }

    fn element_store_mut(&mut self, kind: NodeKind) -> Option<&mut IndexMap<String, ModelElement>> {
        match kind {
            NodeKind::Region => Some(&mut self.regions),
            NodeKind::Header => Some(&mut self.headers),
            NodeKind::Action => Some(&mut self.actions),
            NodeKind::ActionGroup => Some(&mut self.action_groups),
            _ => None,
        }
    }
}

impl ModelNode for ModelDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Definition
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
