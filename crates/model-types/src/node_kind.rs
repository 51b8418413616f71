//! Node kinds of the definition model.
//!
//! Every path step names one of these kinds, and operations are registered
//! per kind, so the set is closed.

use serde::{Deserialize, Serialize};

/// Kind of a node inside a `Models` aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Definition,
    Field,
    Region,
    Header,
    Action,
    ActionGroup,
    Attribute,
}

impl NodeKind {
    /// All kinds, in path nesting order.
    pub const ALL: [NodeKind; 7] = [
        Self::Definition,
        Self::Field,
        Self::Region,
        Self::Header,
        Self::Action,
        Self::ActionGroup,
        Self::Attribute,
    ];

    /// Kinds that live directly under a definition and can be overridden there.
    pub const CHILDREN: [NodeKind; 5] = [
        Self::Field,
        Self::Region,
        Self::Header,
        Self::Action,
        Self::ActionGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Field => "field",
            Self::Region => "region",
            Self::Header => "header",
            Self::Action => "action",
            Self::ActionGroup => "actionGroup",
            Self::Attribute => "attribute",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "definition" => Some(Self::Definition),
            "field" => Some(Self::Field),
            "region" => Some(Self::Region),
            "header" => Some(Self::Header),
            "action" => Some(Self::Action),
            "actionGroup" => Some(Self::ActionGroup),
            "attribute" => Some(Self::Attribute),
            _ => None,
        }
    }

    /// Whether nodes of this kind sit directly under a definition.
    pub fn is_definition_child(&self) -> bool {
        Self::CHILDREN.contains(self)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
