/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::{
    ids::{EntityKey, RawNodeId},
    metrics::MetricKey,
    time::SampleTime,
};

use super::change_points::ChangePoints;

/// Field under which a sample may carry its own change-point list.
const POINT_CHANGE_POINTS: &str = "change_points";

/// One node or edge series as returned by the change-point endpoint.
#[serde_as]
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct SeriesItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<RawNodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RawNodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<RawNodeId>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub series: Vec<SeriesPoint>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub change_points: Vec<SampleTime>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct SeriesPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<SampleTime>,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// The change-point endpoint answers either with a bare list or with
/// a `{data: [...]}` envelope.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ChangePointPayload {
    Items(Vec<SeriesItem>),
    Envelope { data: Option<Vec<SeriesItem>> },
}

impl SeriesItem {
    pub fn node(node: &str) -> Self {
        Self {
            node: Some(node.into()),
            ..Default::default()
        }
    }

    pub fn edge(source: &str, target: &str) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn with_sample(
        mut self,
        time: impl Into<SampleTime>,
        metric: MetricKey,
        value: f64,
    ) -> Self {
        self.series.push(SeriesPoint::new(time).with_value(metric, value));
        self
    }

    pub fn with_change_point(mut self, time: impl Into<SampleTime>) -> Self {
        self.change_points.push(time.into());
        self
    }

    /// The node id when present, otherwise the `source->target` pair.
    pub fn entity_key(&self) -> Option<EntityKey> {
        if let Some(node) = self.node.as_ref().and_then(RawNodeId::to_node_id) {
            return Some(EntityKey::Node(node));
        }
        let source = self.source.as_ref()?.to_node_id()?;
        let target = self.target.as_ref()?.to_node_id()?;
        Some(EntityKey::Edge(source, target))
    }

    /// The item's change-point times, including any listed on the
    /// individual samples.
    pub fn change_points(&self) -> ChangePoints {
        let mut change_points = self.change_points.iter().cloned().collect::<ChangePoints>();
        self.series
            .iter()
            .filter_map(|point| point.values.get(POINT_CHANGE_POINTS))
            .for_each(|times| {
                match serde_json::from_value::<Vec<SampleTime>>(times.clone()) {
                    Ok(times) => change_points.extend(times),
                    Err(e) => log::debug!("ignoring malformed sample change points: {e}"),
                }
            });
        change_points
    }
}

impl SeriesPoint {
    pub fn new(time: impl Into<SampleTime>) -> Self {
        Self {
            time: Some(time.into()),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, metric: MetricKey, value: f64) -> Self {
        self.values
            .insert(metric.key().to_string(), serde_json::Value::from(value));
        self
    }

    /// The sample's numeric value for the metric, if any.
    pub fn value(&self, metric: MetricKey) -> Option<f64> {
        self.values.get(metric.key()).and_then(|v| v.as_f64())
    }
}

impl ChangePointPayload {
    pub fn into_items(self) -> Vec<SeriesItem> {
        match self {
            ChangePointPayload::Items(items) => items,
            ChangePointPayload::Envelope { data: Some(items) } => items,
            ChangePointPayload::Envelope { data: None } => {
                log::error!("invalid change point payload: missing data");
                Vec::new()
            }
        }
    }
}
