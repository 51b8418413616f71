//! Change propagation engine.
//!
//! One submitted change-set is resolved, dispatched, validated and applied;
//! the follow-ups it produces go to the back of a FIFO work queue and run
//! through the same cycle against the already-mutated tree until the queue
//! drains. The ordered list of applied entries is the result.
//!
//! The engine mutates `Models` in place and stops on the first error. Callers
//! that need all-or-nothing behaviour apply to a copy (see `ModelUpdater`).

use std::collections::VecDeque;
use std::sync::Arc;

use model_types::{ModelChangeSet, ModelChangeSetInfo};

use crate::config::EngineConfig;
use crate::error::{ModelChangeError, Result};
use crate::model::Models;
use crate::operation::{ModelChangeSetOperation, OperationRegistry};

/// Queue entry: a change-set plus how many cascades deep it was produced.
struct Pending {
    change_set: ModelChangeSet,
    depth: usize,
}

#[derive(Debug, Clone)]
pub struct ModelChangeEngine {
    registry: OperationRegistry,
    config: EngineConfig,
}

impl Default for ModelChangeEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ModelChangeEngine {
    /// Engine with every built-in operation registered.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(OperationRegistry::with_builtins(), config)
    }

    pub fn with_registry(registry: OperationRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add or replace an operation.
    pub fn register_operation(&mut self, op: Arc<dyn ModelChangeSetOperation>) {
        self.registry.register(op);
    }

    /// Apply `change_set` and its whole cascade to `models`.
    ///
    /// The returned trace starts with the submitted change-set and lists every
    /// cascaded entry in application order. Change-sets that validate as
    /// no-ops are skipped and not recorded.
    pub fn apply_change_set(
        &self,
        models: &mut Models,
        change_set: ModelChangeSet,
    ) -> Result<Vec<ModelChangeSetInfo>> {
        let mut queue = VecDeque::from([Pending {
            change_set,
            depth: 0,
        }]);
        let mut trace = Vec::new();

        while let Some(Pending { change_set, depth }) = queue.pop_front() {
            if depth > self.config.max_cascade_depth {
                return Err(ModelChangeError::CascadeLimitExceeded {
                    path: change_set.path.pretty_print(),
                    depth,
                });
            }

            let target = models
                .resolve(&change_set.path)
                .ok_or_else(|| ModelChangeError::unresolved(&change_set.path))?;
            let kind = target.kind();
            let operation = self.registry.get(&change_set.operation, kind).ok_or_else(|| {
                ModelChangeError::UnsupportedOperation {
                    operation: change_set.operation.clone(),
                    kind,
                    path: change_set.path.pretty_print(),
                }
            })?;

            let info = ModelChangeSetInfo::new(change_set, kind, depth > 0);
            let effective = match operation.validate(models, &target, &info) {
                Ok(effective) => effective,
                Err(err) => {
                    if err.is_collision() {
                        tracing::warn!(path = %info.path(), error = %err, "change-set collision");
                    }
                    return Err(err);
                }
            };
            if !effective {
                tracing::debug!(
                    operation = %info.operation,
                    path = %info.path(),
                    "change-set has no effect"
                );
                continue;
            }

            let follow_ups = operation.apply_change(models, &info.change_set)?;
            tracing::debug!(
                operation = %info.operation,
                path = %info.path(),
                intermediate = info.intermediate,
                follow_ups = follow_ups.len(),
                "applied change-set"
            );
            trace.push(info);
            queue.extend(follow_ups.into_iter().map(|change_set| Pending {
                change_set,
                depth: depth + 1,
            }));
        }

        Ok(trace)
    }

    /// Re-apply a recorded trace in order.
    ///
    /// Entries are applied exactly as recorded: no validation, and follow-ups
    /// are ignored because the trace already lists them.
    pub fn replay(&self, models: &mut Models, effects: &[ModelChangeSetInfo]) -> Result<()> {
        for info in effects {
            let operation = self.registry.get(&info.operation, info.node_kind).ok_or_else(|| {
                ModelChangeError::UnsupportedOperation {
                    operation: info.operation.clone(),
                    kind: info.node_kind,
                    path: info.path().pretty_print(),
                }
            })?;
            operation.apply_change(models, &info.change_set)?;
        }
        Ok(())
    }
}
