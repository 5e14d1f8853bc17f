/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{EntityKey, NodeId};

use super::serial::{truthy_number, RawEdge, RawGraph, RawNode};

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Serialize, Deserialize, PartialEq, Clone, Default, Debug)]
pub struct CanonicalGraph {
    pub nodes: Vec<CanonicalNode>,
    pub links: Vec<CanonicalEdge>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct CanonicalNode {
    pub id: NodeId,
    pub importance: f64,
    pub dependence: f64,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub latency_ms: f64,
    pub frequency: f64,
    pub co_execution: f64,
}

/// Bring a backend graph into canonical shape. Missing or falsy
/// numeric fields take their defaults (weight 1, everything else 0).
/// Nodes without an id and edges without both endpoints cannot be
/// drawn and are dropped, so the output may be shorter than the input.
pub fn normalize(raw: &RawGraph) -> CanonicalGraph {
    CanonicalGraph {
        nodes: raw.nodes.iter().filter_map(normalize_node).collect(),
        links: raw.edges.iter().filter_map(normalize_edge).collect(),
    }
}

fn normalize_node(node: &RawNode) -> Option<CanonicalNode> {
    let Some(id) = node.id.as_ref().and_then(|id| id.to_node_id()) else {
        log::warn!("dropping graph node without id");
        return None;
    };
    Some(CanonicalNode {
        id,
        importance: number_or(node.absolute_importance.as_ref(), 0.0),
        dependence: number_or(node.absolute_dependence.as_ref(), 0.0),
    })
}

fn normalize_edge(edge: &RawEdge) -> Option<CanonicalEdge> {
    let source = edge.source.as_ref().and_then(|s| s.to_node_id());
    let target = edge.target.as_ref().and_then(|t| t.to_node_id());
    let (Some(source), Some(target)) = (source, target) else {
        log::warn!("dropping graph edge without source or target");
        return None;
    };
    Some(CanonicalEdge {
        source,
        target,
        weight: number_or(edge.weight.as_ref(), DEFAULT_WEIGHT),
        latency_ms: number_or(edge.latency_ms.as_ref(), 0.0),
        frequency: number_or(edge.frequency.as_ref(), 0.0),
        co_execution: number_or(edge.co_execution.as_ref(), 0.0),
    })
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    truthy_number(value).unwrap_or(default)
}

impl CanonicalGraph {
    /// No nodes and no links: nothing to show for the selected window.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&CanonicalNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn links_from<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a CanonicalEdge> {
        self.links.iter().filter(move |link| &link.source == id)
    }

    pub fn links_to<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a CanonicalEdge> {
        self.links.iter().filter(move |link| &link.target == id)
    }
}

impl CanonicalNode {
    pub fn key(&self) -> EntityKey {
        EntityKey::Node(self.id.clone())
    }
}

impl CanonicalEdge {
    pub fn key(&self) -> EntityKey {
        EntityKey::Edge(self.source.clone(), self.target.clone())
    }
}

impl From<&CanonicalGraph> for RawGraph {
    fn from(graph: &CanonicalGraph) -> Self {
        RawGraph {
            nodes: graph.nodes.iter().map(RawNode::from).collect(),
            edges: graph.links.iter().map(RawEdge::from).collect(),
        }
    }
}

impl From<&CanonicalNode> for RawNode {
    fn from(node: &CanonicalNode) -> Self {
        RawNode {
            id: Some((&node.id).into()),
            absolute_importance: Some(Value::from(node.importance)),
            absolute_dependence: Some(Value::from(node.dependence)),
        }
    }
}

impl From<&CanonicalEdge> for RawEdge {
    fn from(edge: &CanonicalEdge) -> Self {
        RawEdge {
            source: Some((&edge.source).into()),
            target: Some((&edge.target).into()),
            weight: Some(Value::from(edge.weight)),
            latency_ms: Some(Value::from(edge.latency_ms)),
            frequency: Some(Value::from(edge.frequency)),
            co_execution: Some(Value::from(edge.co_execution)),
        }
    }
}
