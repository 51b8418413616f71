//! Model Types - addressing and change-set values for the definition model.
//!
//! This crate holds the pure value types shared between the change-set engine
//! and its callers:
//! - `Path` / `PathStep` - addresses of nodes and attributes
//! - `NodeKind` - the closed set of node kinds
//! - `ModelChangeSet` - an edit request
//! - `ModelChangeSetInfo` - a resolved, applied unit of work
//! - `ModelUpdateRequest` / `ModelUpdateResponse` - versioned batches
//!
//! # Example
//!
//! ```
//! use model_types::{ModelChangeSet, NodeKind, Path};
//! use serde_json::json;
//!
//! let path = Path::parse("definition=PR0001/field=hasWatcher/attribute=order").unwrap();
//! assert_eq!(path.kind(), NodeKind::Attribute);
//!
//! let change = ModelChangeSet::modify_attribute(path, json!(10), json!(50));
//! assert_eq!(change.operation, "modifyAttribute");
//! ```

mod change_set;
mod node_kind;
mod path;

pub use change_set::{
    operation_names, ModelChangeSet, ModelChangeSetInfo, ModelUpdateRequest, ModelUpdateResponse,
};
pub use node_kind::NodeKind;
pub use path::{Path, PathError, PathStep};
