/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{
    error::{Error, Result},
    metrics::MetricScope,
};

/// Separator used in synthetic edge keys (`source->target`).
pub const EDGE_SEPARATOR: &str = "->";

#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub struct NodeId(String);

/// Identity of a series: either a node or a directed edge between
/// two nodes.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub enum EntityKey {
    Node(NodeId),
    Edge(NodeId, NodeId),
}

/// A node id as found in backend payloads, which use both strings
/// and numbers.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(untagged)]
pub enum RawNodeId {
    Text(String),
    Number(serde_json::Number),
}

impl RawNodeId {
    /// Empty ids identify nothing.
    pub fn to_node_id(&self) -> Option<NodeId> {
        match self {
            RawNodeId::Text(s) if s.is_empty() => None,
            RawNodeId::Text(s) => Some(NodeId(s.clone())),
            RawNodeId::Number(n) => Some(NodeId(n.to_string())),
        }
    }
}

impl From<&str> for RawNodeId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&NodeId> for RawNodeId {
    fn from(value: &NodeId) -> Self {
        Self::Text(value.0.clone())
    }
}

impl NodeId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl EntityKey {
    pub fn node(id: impl Into<String>) -> Self {
        Self::Node(NodeId(id.into()))
    }

    pub fn edge(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Edge(NodeId(source.into()), NodeId(target.into()))
    }

    pub fn scope(&self) -> MetricScope {
        match self {
            EntityKey::Node(_) => MetricScope::Node,
            EntityKey::Edge(_, _) => MetricScope::Edge,
        }
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::Node(id) => write!(f, "{id}"),
            EntityKey::Edge(source, target) => write!(f, "{source}{EDGE_SEPARATOR}{target}"),
        }
    }
}

impl FromStr for EntityKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidEntityKey(s.to_string()));
        }
        match s.split_once(EDGE_SEPARATOR) {
            Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                Ok(Self::edge(source, target))
            }
            Some(_) => Err(Error::InvalidEntityKey(s.to_string())),
            None => Ok(Self::node(s)),
        }
    }
}
