/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};

/// A metric that can be plotted on the change-point view. Edge and
/// node metrics form two disjoint namespaces.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub enum MetricKey {
    Latency,
    CoExecution,
    Frequency,
    Importance,
    Dependence,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum MetricScope {
    Node,
    Edge,
}

pub const EDGE_METRICS: [MetricKey; 3] = [
    MetricKey::Latency,
    MetricKey::CoExecution,
    MetricKey::Frequency,
];

pub const NODE_METRICS: [MetricKey; 2] = [MetricKey::Importance, MetricKey::Dependence];

/// A selectable metric option, as presented to the user.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct MetricOption {
    pub key: MetricKey,
    pub label: String,
    pub scope: MetricScope,
}

impl MetricKey {
    /// The key as used in requests and in series samples.
    pub fn key(&self) -> &'static str {
        match self {
            MetricKey::Latency => "lat",
            MetricKey::CoExecution => "coexec",
            MetricKey::Frequency => "freq",
            MetricKey::Importance => "imp",
            MetricKey::Dependence => "dep",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::Latency => "Latency",
            MetricKey::CoExecution => "Co-Execution",
            MetricKey::Frequency => "Frequency",
            MetricKey::Importance => "Absolute Importance",
            MetricKey::Dependence => "Absolute Dependence",
        }
    }

    pub fn scope(&self) -> MetricScope {
        match self {
            MetricKey::Latency | MetricKey::CoExecution | MetricKey::Frequency => {
                MetricScope::Edge
            }
            MetricKey::Importance | MetricKey::Dependence => MetricScope::Node,
        }
    }
}

impl Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for MetricKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        EDGE_METRICS
            .into_iter()
            .chain(NODE_METRICS)
            .find(|metric| metric.key() == s)
            .ok_or_else(|| Error::UnknownMetric(s.to_string()))
    }
}

impl Display for MetricScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricScope::Node => write!(f, "node"),
            MetricScope::Edge => write!(f, "edge"),
        }
    }
}

/// Determine the namespace a metric key belongs to.
pub fn classify(key: &str) -> Result<MetricScope> {
    Ok(MetricKey::from_str(key)?.scope())
}

/// All selectable metrics: edge metrics first, then node metrics.
pub fn metric_options() -> Vec<MetricOption> {
    EDGE_METRICS
        .into_iter()
        .chain(NODE_METRICS)
        .map(|key| MetricOption {
            key,
            label: key.label().to_string(),
            scope: key.scope(),
        })
        .collect()
}

/// Weighting applied by the backend when computing the weighted
/// dependency graph.
#[derive(
    SerializeDisplay,
    DeserializeFromStr,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Default,
    Debug,
)]
pub enum WeightType {
    #[default]
    CoExecution,
    Latency,
    Frequency,
}

impl WeightType {
    pub fn label(&self) -> &'static str {
        match self {
            WeightType::CoExecution => "CoExecution",
            WeightType::Latency => "Latency",
            WeightType::Frequency => "Frequency",
        }
    }
}

impl Display for WeightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightType::CoExecution => write!(f, "CO"),
            WeightType::Latency => write!(f, "Lat"),
            WeightType::Frequency => write!(f, "Freq"),
        }
    }
}

impl FromStr for WeightType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CO" => Ok(Self::CoExecution),
            "Lat" => Ok(Self::Latency),
            "Freq" => Ok(Self::Frequency),
            _ => Err(Error::UnknownWeightType(s.to_string())),
        }
    }
}
