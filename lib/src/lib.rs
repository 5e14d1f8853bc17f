/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

pub mod graph;
pub mod metrics;
pub mod resiliency;
pub mod series;

#[cfg(feature = "client")]
pub mod client;

pub(crate) mod error;
pub(crate) mod ids;
pub(crate) mod time;

pub use error::{Error, Result};
pub use ids::{EntityKey, NodeId, RawNodeId, EDGE_SEPARATOR};
pub use time::{EpochUnit, SampleTime, TimeRange, Timestamp};

pub use graph::canonical::{normalize, CanonicalEdge, CanonicalGraph, CanonicalNode};
pub use metrics::{
    classify, metric_options, MetricKey, MetricOption, MetricScope, WeightType, EDGE_METRICS,
    NODE_METRICS,
};
pub use resiliency::{resiliency_charts, ChartSeries, ResiliencyCharts, ResiliencyScore};
pub use series::aligned::{
    align, align_with, AlignOptions, AlignedRow, AlignedTable, ChangePointMarker,
};
pub use series::change_points::{is_change_point, ChangePoints};
pub use series::serial::{ChangePointPayload, SeriesItem, SeriesPoint};

#[cfg(feature = "client")]
pub use client::{ClientConfig, GraphClient};

pub mod serial {
    pub use crate::graph::serial::{
        AntiPatternResponse, RawEdge, RawEndpoint, RawGraph, RawNode, WeightedGraphData,
        WeightedGraphResponse,
    };
    pub use crate::resiliency::DeploymentId;
}
