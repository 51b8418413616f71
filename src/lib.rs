//! Model change-set engine.
//!
//! Applies attribute and structural edits to a hierarchical definition model
//! whose nodes locally override inherited values. Each submitted
//! `ModelChangeSet` is collision-checked against the stored value, applied,
//! and cascaded into whatever follow-up edits keep the override layer
//! consistent (a restored region unassigns its fields, a node whose last
//! override is restored is removed).
//!
//! # Example
//!
//! ```
//! use model_changeset::{ModelChangeEngine, ModelChangeSet, ModelDefinition, Models, Path};
//! use serde_json::json;
//!
//! let mut models = Models::default().with_definition(ModelDefinition::new("PR0001"));
//! let engine = ModelChangeEngine::default();
//!
//! let order = Path::parse("definition=PR0001/field=hasWatcher/attribute=order").unwrap();
//! let trace = engine
//!     .apply_change_set(&mut models, ModelChangeSet::modify_attribute(order.clone(), json!(0), json!(10)))
//!     .unwrap();
//! assert_eq!(trace.len(), 1);
//!
//! let trace = engine
//!     .apply_change_set(&mut models, ModelChangeSet::restore(order))
//!     .unwrap();
//! assert_eq!(trace.last().unwrap().operation, "removeNode");
//! assert!(models.definition("PR0001").unwrap().field("hasWatcher").is_none());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod operation;
pub mod update;

pub use config::EngineConfig;
pub use engine::ModelChangeEngine;
pub use error::{ModelChangeError, Result};
pub use model::{
    ModelAttribute, ModelDefinition, ModelElement, ModelField, ModelMetaInfo, ModelNode,
    ModelNodeRef, Models, ModelsDocument, ModelsMetaInfo, ResolvedNode,
};
pub use operation::{ModelChangeSetOperation, OperationRegistry};
pub use update::{HistoryEntry, ModelUpdater};

pub use model_types::{
    operation_names, ModelChangeSet, ModelChangeSetInfo, ModelUpdateRequest, ModelUpdateResponse,
    NodeKind, Path, PathError, PathStep,
};
