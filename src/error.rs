use model_types::{NodeKind, Path, PathError};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while applying change-sets.
///
/// A collision is an optimistic-concurrency conflict: the caller should
/// re-read and resubmit. Every other variant is a malformed request that will
/// fail the same way again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelChangeError {
    #[error(
        "collision on '{node}' attribute '{attribute}': current value {} but expected {}",
        display_value(current),
        display_value(expected)
    )]
    Collision {
        /// Id of the node owning the value (its path tail).
        node: String,
        attribute: String,
        current: Option<Value>,
        expected: Option<Value>,
    },

    #[error("path does not resolve: {0}")]
    UnresolvedPath(String),

    #[error("no operation '{operation}' for {kind} at {path}")]
    UnsupportedOperation {
        operation: String,
        kind: NodeKind,
        path: String,
    },

    #[error("invalid change at {path}: {reason}")]
    InvalidChange { path: String, reason: String },

    #[error("cascade depth {depth} exceeded while applying {path}")]
    CascadeLimitExceeded { path: String, depth: usize },

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, ModelChangeError>;

impl ModelChangeError {
    pub fn unresolved(path: &Path) -> Self {
        Self::UnresolvedPath(path.pretty_print())
    }

    pub fn invalid_change(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidChange {
            path: path.pretty_print(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Collision { .. } => "collision",
            Self::UnresolvedPath(_) => "unresolved_path",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::InvalidChange { .. } => "invalid_change",
            Self::CascadeLimitExceeded { .. } => "cascade_limit_exceeded",
            Self::InvalidPath(_) => "invalid_path",
        }
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }

    /// Client or programming defect; retrying will not help.
    pub fn is_malformed(&self) -> bool {
        !self.is_collision()
    }
}

fn display_value(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}
