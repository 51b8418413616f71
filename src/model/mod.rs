//! The definition model tree edited by the change-set engine.
//!
//! - `Models` - aggregate root, path resolution
//! - `ModelDefinition` - per-definition override layer
//! - `ModelField`, `ModelElement` (regions, headers, actions, action groups)
//! - `ModelAttribute` with its `ModelMetaInfo`
//! - `ModelsDocument` - serde form for loading and dumping

mod definition;
mod document;
mod meta;
mod models;
mod node;

pub use definition::ModelDefinition;
pub use document::{DefinitionDocument, FieldDocument, ModelsDocument, NodeDocument};
pub use meta::{ModelMetaInfo, ModelsMetaInfo};
pub use models::{ModelNodeRef, Models, ResolvedNode};
pub use node::{
    AttributeMap, ModelAction, ModelActionGroup, ModelAttribute, ModelElement, ModelField,
    ModelHeader, ModelNode, ModelRegion,
};
