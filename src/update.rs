//! Versioned batch updates.
//!
//! `ModelUpdater` owns a `Models` aggregate plus the history of every applied
//! effect, tagged with the model version that produced it. A request is
//! applied to a working copy; the copy replaces the live tree only when every
//! change in the request succeeded.

use model_types::{ModelChangeSetInfo, ModelUpdateRequest, ModelUpdateResponse};

use crate::engine::ModelChangeEngine;
use crate::error::Result;
use crate::model::Models;

/// One applied effect and the version it was committed under.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub version: u64,
    pub effect: ModelChangeSetInfo,
}

#[derive(Debug)]
pub struct ModelUpdater {
    engine: ModelChangeEngine,
    models: Models,
    history: Vec<HistoryEntry>,
}

impl ModelUpdater {
    pub fn new(engine: ModelChangeEngine, models: Models) -> Self {
        Self {
            engine,
            models,
            history: Vec::new(),
        }
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn into_models(self) -> Models {
        self.models
    }

    pub fn version(&self) -> u64 {
        self.models.version()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Apply every change of `request` atomically.
    ///
    /// On error the live tree and history are untouched. On success the
    /// response carries the current version and every effect newer than
    /// `request.model_version`.
    pub fn update(&mut self, request: &ModelUpdateRequest) -> Result<ModelUpdateResponse> {
        let mut working = self.models.clone();
        let mut effects = Vec::new();
        for change in &request.changes {
            effects.extend(self.engine.apply_change_set(&mut working, change.clone())?);
        }

        if !effects.is_empty() {
            let version = working.bump_version();
            tracing::info!(
                version,
                changes = request.changes.len(),
                effects = effects.len(),
                "committed model update"
            );
            self.history
                .extend(effects.into_iter().map(|effect| HistoryEntry { version, effect }));
        }
        self.models = working;

        Ok(ModelUpdateResponse {
            model_version: self.version(),
            change_sets: self.changes_since(request.model_version),
        })
    }

    /// Effects committed under versions newer than `version`, in order.
    pub fn changes_since(&self, version: u64) -> Vec<ModelChangeSetInfo> {
        self.history
            .iter()
            .filter(|entry| entry.version > version)
            .map(|entry| entry.effect.clone())
            .collect()
    }
}
