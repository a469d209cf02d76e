//! EMD group types and the closed set of node classes.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Recognized values of the `emd_group_type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    Root,
    Node,
    Metadata,
    MetadataBundle,
}

impl GroupType {
    pub const ALL: [GroupType; 4] = [
        GroupType::Root,
        GroupType::Node,
        GroupType::Metadata,
        GroupType::MetadataBundle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Root => "root",
            GroupType::Node => "node",
            GroupType::Metadata => "metadata",
            GroupType::MetadataBundle => "metadatabundle",
        }
    }

    /// Whether groups of this type hold a tree node.
    pub fn is_node(&self) -> bool {
        matches!(self, GroupType::Root | GroupType::Node)
    }
}

impl FromStr for GroupType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::InvalidGroupType(s.to_string()))
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete node classes.
///
/// Deserialization dispatches on [`NodeClass::from_class_name`]; adding a
/// class means adding a variant here and its arms in the codec hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Node,
    Root,
}

impl NodeClass {
    pub const ALL: [NodeClass; 2] = [NodeClass::Node, NodeClass::Root];

    pub fn group_type(&self) -> GroupType {
        match self {
            NodeClass::Node => GroupType::Node,
            NodeClass::Root => GroupType::Root,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            NodeClass::Node => "Node",
            NodeClass::Root => "Root",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        NodeClass::ALL.into_iter().find(|c| c.class_name() == name)
    }

    /// Default class for a group whose class tag is missing.
    pub fn for_group_type(group_type: GroupType) -> Option<Self> {
        match group_type {
            GroupType::Root => Some(NodeClass::Root),
            GroupType::Node => Some(NodeClass::Node),
            GroupType::Metadata | GroupType::MetadataBundle => None,
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}
