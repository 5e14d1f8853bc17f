/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Outcome of one chaos test run against a deployment of a service.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResiliencyScore {
    pub deployment_id: DeploymentId,
    #[serde(default)]
    pub no_of_requests: Option<u64>,
    #[serde(default)]
    pub resiliency_score: Option<f64>,
    #[serde(default)]
    pub failure_rate: Option<f64>,
    #[serde(default)]
    pub avg_latency: Option<f64>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(untagged)]
pub enum DeploymentId {
    Number(i64),
    Text(String),
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResiliencyCharts {
    pub labels: Vec<String>,
    pub resiliency_score: ChartSeries,
    pub failure_rate: ChartSeries,
    pub avg_latency: ChartSeries,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

impl Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentId::Number(n) => write!(f, "{n}"),
            DeploymentId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl ResiliencyScore {
    pub fn label(&self) -> String {
        match self.no_of_requests {
            Some(n) => format!("ID: {} | Req: {n}", self.deployment_id),
            None => format!("ID: {} | Req: N/A", self.deployment_id),
        }
    }
}

/// Reshape test runs into the three chart series of the resiliency
/// view. Returns `None` when there is nothing to plot.
pub fn resiliency_charts(scores: &[ResiliencyScore]) -> Option<ResiliencyCharts> {
    if scores.is_empty() {
        return None;
    }

    let series = |label: &str, f: fn(&ResiliencyScore) -> Option<f64>| ChartSeries {
        label: label.to_string(),
        data: scores.iter().map(f).collect(),
    };

    Some(ResiliencyCharts {
        labels: scores.iter().map(ResiliencyScore::label).collect(),
        resiliency_score: series("Resiliency Scores", |s| s.resiliency_score),
        failure_rate: series("Failure Rate", |s| s.failure_rate),
        avg_latency: series("Avg Latency", |s| s.avg_latency),
    })
}
