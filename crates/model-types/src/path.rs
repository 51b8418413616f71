//! Path - addressing for nodes and attributes inside a `Models` aggregate.
//!
//! Canonical textual form is a list of `kind=value` steps joined by `/`:
//!
//! ```text
//! definition=PR0001/field=hasWatcher/attribute=order
//! ```
//!
//! Parsing only checks the step grammar. Whether the arrangement of steps
//! addresses something real is decided when the path is resolved against a
//! model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node_kind::NodeKind;

const STEP_SEPARATOR: char = '/';
const VALUE_SEPARATOR: char = '=';

/// Errors produced while parsing a textual path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("malformed path step '{0}': expected kind=value")]
    MalformedStep(String),

    #[error("unknown path step kind '{0}'")]
    UnknownKind(String),

    #[error("path step '{0}' has an empty value")]
    EmptyValue(String),

    #[error("'{0}' cannot be a path value: it contains '/' or surrounding whitespace")]
    InvalidValue(String),
}

/// One `kind=value` segment of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub kind: NodeKind,
    pub value: String,
}

impl PathStep {
    pub fn new(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Check that `value` renders into a step that `Path::parse` reads back
    /// unchanged. Node ids and attribute names go through this before they
    /// enter a model.
    pub fn check_value(value: &str) -> Result<(), PathError> {
        if value.is_empty() {
            return Err(PathError::EmptyValue(value.to_string()));
        }
        if value.contains(STEP_SEPARATOR) || value.trim() != value {
            return Err(PathError::InvalidValue(value.to_string()));
        }
        Ok(())
    }

    fn parse(raw: &str) -> Result<Self, PathError> {
        let (kind, value) = raw
            .split_once(VALUE_SEPARATOR)
            .ok_or_else(|| PathError::MalformedStep(raw.to_string()))?;
        let kind = NodeKind::parse(kind).ok_or_else(|| PathError::UnknownKind(kind.to_string()))?;
        if value.is_empty() {
            return Err(PathError::EmptyValue(raw.to_string()));
        }
        Ok(Self::new(kind, value))
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, VALUE_SEPARATOR, self.value)
    }
}

/// Address of exactly one node or attribute. Never empty.
///
/// Equality and hashing are over the full step sequence.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    /// Parse the canonical textual form.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let trimmed = s.trim().trim_matches(STEP_SEPARATOR);
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        let steps = trimmed
            .split(STEP_SEPARATOR)
            .map(PathStep::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    /// Path of a definition, the root of every model path.
    pub fn definition(id: impl Into<String>) -> Self {
        Self::from_step(PathStep::new(NodeKind::Definition, id))
    }

    pub fn from_step(step: PathStep) -> Self {
        Self { steps: vec![step] }
    }

    /// Build from raw steps. Returns `None` for an empty list.
    pub fn from_steps(steps: Vec<PathStep>) -> Option<Self> {
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps })
        }
    }

    /// A new path one level below this one.
    pub fn child(&self, kind: NodeKind, value: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::new(kind, value));
        Self { steps }
    }

    /// Shorthand for `child(NodeKind::Attribute, name)`.
    pub fn attribute(&self, name: impl Into<String>) -> Self {
        self.child(NodeKind::Attribute, name)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn head(&self) -> &PathStep {
        &self.steps[0]
    }

    /// Last step; its value is the addressed node's own identifier.
    pub fn tail(&self) -> &PathStep {
        &self.steps[self.steps.len() - 1]
    }

    /// Identifier of the addressed node.
    pub fn value(&self) -> &str {
        &self.tail().value
    }

    /// Kind of the addressed node.
    pub fn kind(&self) -> NodeKind {
        self.tail().kind
    }

    /// Path of the owning context, or `None` for a single-step path.
    pub fn cut_off_tail(&self) -> Option<Self> {
        if self.steps.len() < 2 {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Human-readable rendering for error messages and logs.
    pub fn pretty_print(&self) -> String {
        self.steps
            .iter()
            .map(|step| format!("{} '{}'", step.kind, step.value))
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", STEP_SEPARATOR)?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({})", self)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
