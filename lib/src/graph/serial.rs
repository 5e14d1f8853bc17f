/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

use crate::ids::{NodeId, RawNodeId};

/// Status reported by the weighted graph endpoint on success.
pub const STATUS_SUCCESS: &str = "success";

/// A dependency graph as produced by the analytics backend. Every
/// field is optional; see [`normalize`](super::canonical::normalize)
/// for the defaults.
#[serde_as]
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct RawGraph {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "links")]
    pub edges: Vec<RawEdge>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawNodeId>,
    #[serde(default, alias = "importance", skip_serializing_if = "Option::is_none")]
    pub absolute_importance: Option<Value>,
    #[serde(default, alias = "dependence", skip_serializing_if = "Option::is_none")]
    pub absolute_dependence: Option<Value>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct RawEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RawEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<RawEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    #[serde(
        default,
        rename = "latency(ms)",
        alias = "latencyMs",
        alias = "latency",
        skip_serializing_if = "Option::is_none"
    )]
    pub latency_ms: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Value>,
    #[serde(default, alias = "coExecution", skip_serializing_if = "Option::is_none")]
    pub co_execution: Option<Value>,
}

/// Edge endpoints are usually plain ids, but graphs that went through
/// a layout engine reference the node object instead.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(untagged)]
pub enum RawEndpoint {
    Id(RawNodeId),
    Node { id: RawNodeId },
}

/// Envelope of the weighted dependency graph endpoint.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct WeightedGraphResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<WeightedGraphData>,
}

/// The graph inside the weighted graph envelope. Unlike a bare
/// [`RawGraph`], both arrays are required for the graph to be usable.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct WeightedGraphData {
    #[serde(default)]
    pub nodes: Option<Vec<RawNode>>,
    #[serde(default, alias = "links")]
    pub edges: Option<Vec<RawEdge>>,
}

/// Envelope of the anti-pattern graph endpoint.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct AntiPatternResponse {
    #[serde(default)]
    pub graph: Option<RawGraph>,
}

impl RawGraph {
    /// Decode a graph from any of the payload shapes: a bare graph,
    /// a `{data: ...}` or a `{graph: ...}` envelope.
    pub fn from_payload(payload: Value) -> serde_json::Result<Self> {
        match payload {
            Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("graph")) {
                Some(Value::Null) => Ok(Self::default()),
                Some(inner) => serde_json::from_value(inner),
                None => serde_json::from_value(Value::Object(obj)),
            },
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }
}

impl RawEndpoint {
    pub fn to_node_id(&self) -> Option<NodeId> {
        match self {
            RawEndpoint::Id(id) | RawEndpoint::Node { id } => id.to_node_id(),
        }
    }
}

impl From<&NodeId> for RawEndpoint {
    fn from(value: &NodeId) -> Self {
        Self::Id(value.into())
    }
}

impl WeightedGraphResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// The graph, or an empty one when the backend had no data for
    /// the requested window or left out its nodes or edges.
    pub fn into_graph(self) -> RawGraph {
        match self.data {
            Some(WeightedGraphData {
                nodes: Some(nodes),
                edges: Some(edges),
            }) => RawGraph { nodes, edges },
            Some(_) => {
                log::warn!("weighted graph data without nodes or edges");
                RawGraph::default()
            }
            None => RawGraph::default(),
        }
    }
}

impl AntiPatternResponse {
    pub fn into_graph(self) -> RawGraph {
        self.graph.unwrap_or_default()
    }
}

/// Read a numeric field the way the dashboard did: absent, null,
/// false, zero, NaN and non-numeric values are all "unset".
pub(crate) fn truthy_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(true) => 1.0,
        _ => return None,
    };
    (n != 0.0 && n.is_finite()).then_some(n)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{truthy_number, RawEndpoint, RawGraph, WeightedGraphResponse};
    use crate::graph::canonical::normalize;
    use crate::ids::NodeId;

    #[test]
    fn truthiness() {
        assert_eq!(truthy_number(None), None);
        assert_eq!(truthy_number(Some(&json!(null))), None);
        assert_eq!(truthy_number(Some(&json!(0))), None);
        assert_eq!(truthy_number(Some(&json!(0.0))), None);
        assert_eq!(truthy_number(Some(&json!(false))), None);
        assert_eq!(truthy_number(Some(&json!(""))), None);
        assert_eq!(truthy_number(Some(&json!("abc"))), None);
        assert_eq!(truthy_number(Some(&json!([1]))), None);
        assert_eq!(truthy_number(Some(&json!(true))), Some(1.0));
        assert_eq!(truthy_number(Some(&json!(" 2.5 "))), Some(2.5));
        assert_eq!(truthy_number(Some(&json!(-3))), Some(-3.0));
    }

    #[test]
    fn null_arrays() {
        let graph = serde_json::from_value::<RawGraph>(json!({
            "nodes": null,
            "edges": null
        }))
        .unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn payload_shapes() {
        let graph = json!({ "nodes": [{ "id": "a" }], "links": [] });
        for payload in [
            graph.clone(),
            json!({ "status": "success", "data": graph.clone() }),
            json!({ "graph": graph.clone() }),
        ] {
            let raw = RawGraph::from_payload(payload).unwrap();
            assert_eq!(raw.nodes.len(), 1);
        }
        assert!(RawGraph::from_payload(json!({ "data": null }))
            .unwrap()
            .nodes
            .is_empty());
    }

    #[test]
    fn endpoint_objects() {
        let endpoints = serde_json::from_value::<Vec<RawEndpoint>>(json!(["a", { "id": "b" }, 3]))
            .unwrap()
            .iter()
            .map(|e| e.to_node_id())
            .collect::<Vec<_>>();
        assert_eq!(
            endpoints,
            vec![
                Some(NodeId::new("a".to_string())),
                Some(NodeId::new("b".to_string())),
                Some(NodeId::new("3".to_string()))
            ]
        );
    }

    #[test]
    fn response_status() {
        let resp = serde_json::from_value::<WeightedGraphResponse>(json!({
            "status": "error",
            "message": "boom"
        }))
        .unwrap();
        assert!(!resp.is_success());
        assert!(resp.into_graph().nodes.is_empty());
    }

    #[test]
    fn incomplete_weighted_graph() {
        for data in [
            json!({ "nodes": [{ "id": "a" }] }),
            json!({ "edges": [{ "source": "a", "target": "b" }] }),
            json!({ "nodes": [{ "id": "a" }], "edges": null }),
            json!(null),
        ] {
            let resp = serde_json::from_value::<WeightedGraphResponse>(json!({
                "status": "success",
                "data": data.clone()
            }))
            .unwrap();
            assert!(resp.is_success());
            assert!(normalize(&resp.into_graph()).is_empty(), "{data}");
        }

        let resp = serde_json::from_value::<WeightedGraphResponse>(json!({
            "status": "success",
            "data": { "nodes": [{ "id": "a" }], "edges": [] }
        }))
        .unwrap();
        assert_eq!(normalize(&resp.into_graph()).nodes.len(), 1);
    }
}
