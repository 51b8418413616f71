//! Operation registry keyed by `(operation name, node kind)`.

use std::collections::HashMap;
use std::sync::Arc;

use model_types::NodeKind;

use super::{
    AssignToRegionOperation, ModelChangeSetOperation, ModifyAttributeOperation,
    RemoveNodeOperation, RestoreAttributeOperation, RestoreNodeOperation, RestoreRegionOperation,
};

/// At most one operation per `(name, kind)`; lookup is a single map probe.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<(String, NodeKind), Arc<dyn ModelChangeSetOperation>>,
}

impl OperationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in operation.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ModifyAttributeOperation));
        registry.register(Arc::new(RestoreAttributeOperation));
        registry.register(Arc::new(RestoreNodeOperation));
        registry.register(Arc::new(RestoreRegionOperation));
        registry.register(Arc::new(RemoveNodeOperation));
        registry.register(Arc::new(AssignToRegionOperation));

        tracing::info!(
            "OperationRegistry initialized with {} (operation, kind) entries",
            registry.operations.len()
        );
        registry
    }

    /// Register `op` for each kind it accepts. An existing entry for the same
    /// key is replaced.
    pub fn register(&mut self, op: Arc<dyn ModelChangeSetOperation>) {
        for &kind in op.accepted_kinds() {
            let key = (op.name().to_string(), kind);
            if self.operations.contains_key(&key) {
                tracing::warn!(
                    operation = op.name(),
                    kind = kind.as_str(),
                    "registration overwriting existing operation"
                );
            }
            self.operations.insert(key, Arc::clone(&op));
        }
    }

    pub fn get(&self, name: &str, kind: NodeKind) -> Option<Arc<dyn ModelChangeSetOperation>> {
        self.operations.get(&(name.to_string(), kind)).cloned()
    }

    pub fn has(&self, name: &str, kind: NodeKind) -> bool {
        self.operations.contains_key(&(name.to_string(), kind))
    }

    /// Registered `(name, kind)` pairs, sorted.
    pub fn list(&self) -> Vec<(&str, NodeKind)> {
        let mut entries: Vec<_> = self
            .operations
            .keys()
            .map(|(name, kind)| (name.as_str(), *kind))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.list())
            .finish()
    }
}
