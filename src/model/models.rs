//! Models - the aggregate root the change-set engine edits.
//!
//! Lookup is by `Path`. Resolution never creates nodes: a path that is well
//! formed and names an existing definition resolves even when the addressed
//! override is absent (the node is purely inherited), and the operations
//! decide what that means.

use std::collections::HashSet;

use indexmap::IndexMap;
use model_types::{NodeKind, Path};
use serde_json::Value;

use super::definition::ModelDefinition;
use super::meta::ModelsMetaInfo;
use super::node::{ModelAttribute, ModelElement, ModelField, ModelNode};

// ── Addressing ────────────────────────────────────────────────

/// A path broken into the parts the tree is organised by.
///
/// Valid shapes:
///   definition
///   definition / attribute
///   definition / child
///   definition / child / attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeAddress<'p> {
    pub definition: &'p str,
    pub child: Option<(NodeKind, &'p str)>,
    pub attribute: Option<&'p str>,
}

impl<'p> NodeAddress<'p> {
    pub fn parse(path: &'p Path) -> Option<Self> {
        let steps = path.steps();
        let head = path.head();
        if head.kind != NodeKind::Definition {
            return None;
        }
        let mut address = Self {
            definition: &head.value,
            child: None,
            attribute: None,
        };
        match &steps[1..] {
            [] => {}
            [attr] if attr.kind == NodeKind::Attribute => {
                address.attribute = Some(&attr.value);
            }
            [child] if child.kind.is_definition_child() => {
                address.child = Some((child.kind, &child.value));
            }
            [child, attr] if child.kind.is_definition_child() && attr.kind == NodeKind::Attribute => {
                address.child = Some((child.kind, &child.value));
                address.attribute = Some(&attr.value);
            }
            _ => return None,
        }
        Some(address)
    }

    /// Kind of the node that owns the addressed attribute.
    fn owner_kind(&self) -> NodeKind {
        self.child
            .map(|(kind, _)| kind)
            .unwrap_or(NodeKind::Definition)
    }
}

// ── Resolution result ─────────────────────────────────────────

/// Borrowed view of a concrete node.
#[derive(Debug, Clone, Copy)]
pub enum ModelNodeRef<'a> {
    Definition(&'a ModelDefinition),
    Field(&'a ModelField),
    Element(&'a ModelElement),
    Attribute(&'a ModelAttribute),
}

impl<'a> ModelNodeRef<'a> {
    pub fn as_node(&self) -> &'a dyn ModelNode {
        match *self {
            Self::Definition(node) => node,
            Self::Field(node) => node,
            Self::Element(node) => node,
            Self::Attribute(node) => node,
        }
    }

    pub fn as_attribute(&self) -> Option<&'a ModelAttribute> {
        match *self {
            Self::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&'a ModelField> {
        match *self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }
}

/// Outcome of resolving a path: the addressed kind and the local node, if a
/// local override exists.
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    path: Path,
    kind: NodeKind,
    owner_kind: Option<NodeKind>,
    node: Option<ModelNodeRef<'a>>,
}

impl<'a> ResolvedNode<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// For attributes, the kind of the node that owns them.
    pub fn owner_kind(&self) -> Option<NodeKind> {
        self.owner_kind
    }

    pub fn node(&self) -> Option<ModelNodeRef<'a>> {
        self.node
    }

    /// Whether a local override exists for the addressed node.
    pub fn exists(&self) -> bool {
        self.node.is_some()
    }

    pub fn attribute(&self) -> Option<&'a ModelAttribute> {
        self.node.and_then(|node| node.as_attribute())
    }

    pub fn field(&self) -> Option<&'a ModelField> {
        self.node.and_then(|node| node.as_field())
    }
}

// ── Aggregate ─────────────────────────────────────────────────

/// Aggregate root holding every definition of one model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Models {
    version: u64,
    definitions: IndexMap<String, ModelDefinition>,
    meta_info: ModelsMetaInfo,
}

impl Models {
    pub fn new(meta_info: ModelsMetaInfo) -> Self {
        Self {
            version: 0,
            definitions: IndexMap::new(),
            meta_info,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub(crate) fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub fn meta_info(&self) -> &ModelsMetaInfo {
        &self.meta_info
    }

    pub fn add_definition(&mut self, definition: ModelDefinition) -> Option<ModelDefinition> {
        self.definitions
            .insert(definition.id().to_string(), definition)
    }

    pub fn with_definition(mut self, definition: ModelDefinition) -> Self {
        self.add_definition(definition);
        self
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.definitions.values()
    }

    pub fn definition(&self, id: &str) -> Option<&ModelDefinition> {
        self.definitions.get(id)
    }

    pub fn definition_mut(&mut self, id: &str) -> Option<&mut ModelDefinition> {
        self.definitions.get_mut(id)
    }

    /// Resolve `path` against the local override layer.
    ///
    /// Returns `None` when the path is not a valid node address or its
    /// definition does not exist.
    pub fn resolve(&self, path: &Path) -> Option<ResolvedNode<'_>> {
        let address = NodeAddress::parse(path)?;
        let definition = self.definitions.get(address.definition)?;

        let owner: Option<&dyn ModelNode> = match address.child {
            None => Some(definition),
            Some((kind, id)) => definition.child(kind, id),
        };

        let (kind, owner_kind, node) = match address.attribute {
            Some(name) => {
                let attribute = owner.and_then(|o| o.attribute(name));
                (
                    NodeKind::Attribute,
                    Some(address.owner_kind()),
                    attribute.map(ModelNodeRef::Attribute),
                )
            }
            None => {
                let node = match address.child {
                    None => Some(ModelNodeRef::Definition(definition)),
                    Some((NodeKind::Field, id)) => definition.field(id).map(ModelNodeRef::Field),
                    Some((kind, id)) => definition.element(kind, id).map(ModelNodeRef::Element),
                };
                (path.kind(), None, node)
            }
        };

        Some(ResolvedNode {
            path: path.clone(),
            kind,
            owner_kind,
            node,
        })
    }

    /// Find an attribute through the inheritance chain: the local override
    /// first, then the same relative path on each parent definition.
    pub fn find_attribute(&self, path: &Path) -> Option<&ModelAttribute> {
        let address = NodeAddress::parse(path)?;
        let name = address.attribute?;
        let mut visited = HashSet::new();
        let mut current = self.definitions.get(address.definition);

        while let Some(definition) = current {
            if !visited.insert(definition.id()) {
                tracing::warn!(definition = definition.id(), "inheritance cycle detected");
                return None;
            }
            let owner: Option<&dyn ModelNode> = match address.child {
                None => Some(definition),
                Some((kind, id)) => definition.child(kind, id),
            };
            if let Some(attribute) = owner.and_then(|o| o.attribute(name)) {
                if attribute.value().is_some() {
                    return Some(attribute);
                }
            }
            current = definition
                .parent()
                .and_then(|parent| self.definitions.get(parent));
        }
        None
    }

    // ── Mutation primitives used by operations ────────────────

    /// Write a local attribute override, creating the owning node override
    /// when needed. Returns `None` if the path does not address an attribute
    /// of an existing definition.
    pub(crate) fn write_attribute(&mut self, path: &Path, value: Value) -> Option<()> {
        let address = NodeAddress::parse(path)?;
        let name = address.attribute?;
        let meta = self.meta_info.attribute(address.owner_kind(), name);
        let definition = self.definitions.get_mut(address.definition)?;
        let attributes = definition.attributes_of_mut(address.child, true)?;
        let owner_path = path.cut_off_tail()?;
        attributes
            .entry(name.to_string())
            .or_insert_with(|| ModelAttribute::new(&owner_path, name, meta))
            .set_value(Some(value));
        Some(())
    }

    /// Remove a local attribute override. Returns the removed attribute.
    pub(crate) fn remove_attribute(&mut self, path: &Path) -> Option<ModelAttribute> {
        let address = NodeAddress::parse(path)?;
        let name = address.attribute?;
        let definition = self.definitions.get_mut(address.definition)?;
        definition
            .attributes_of_mut(address.child, false)?
            .shift_remove(name)
    }

    /// Remove a child node override. Definitions are never removed here.
    pub(crate) fn remove_node(&mut self, path: &Path) -> bool {
        let Some(address) = NodeAddress::parse(path) else {
            return false;
        };
        let (Some((kind, id)), None) = (address.child, address.attribute) else {
            return false;
        };
        self.definitions
            .get_mut(address.definition)
            .map(|definition| definition.remove_child(kind, id))
            .unwrap_or(false)
    }

    /// Assign a field to a region (or unassign with `None`). The field
    /// override is created when absent, and so is the region node when the
    /// field is moved into a region not yet present locally.
    pub(crate) fn assign_field_region(
        &mut self,
        field_path: &Path,
        region_id: Option<String>,
    ) -> Option<()> {
        let address = NodeAddress::parse(field_path)?;
        let (NodeKind::Field, field_id) = address.child? else {
            return None;
        };
        if address.attribute.is_some() {
            return None;
        }
        let definition = self.definitions.get_mut(address.definition)?;
        if let Some(region) = &region_id {
            definition.get_or_create_element(NodeKind::Region, region);
        }
        match definition.field_mut(field_id) {
            Some(field) => field.set_region_id(region_id),
            None => definition.get_or_create_field(field_id).set_region_id(region_id),
        }
        Some(())
    }
}
