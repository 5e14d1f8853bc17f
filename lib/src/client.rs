/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    graph::{
        canonical::{normalize, CanonicalGraph},
        serial::{AntiPatternResponse, RawGraph, WeightedGraphResponse},
    },
    metrics::{MetricKey, WeightType},
    resiliency::ResiliencyScore,
    series::{
        aligned::{align, AlignedTable},
        serial::{ChangePointPayload, SeriesItem},
    },
    time::TimeRange,
};

pub const WEIGHTED_GRAPH_PATH: &str = "api/graphs/weight";
pub const CHANGE_POINTS_PATH: &str = "api/metrics/change-points";
pub const ANTI_PATTERN_PATH: &str = "api/graphs/anti-patterns";
pub const SERVICE_NAMES_PATH: &str = "api/resiliency/get-service-name";
pub const RESILIENCY_SCORE_PATH: &str = "api/resiliency/score";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Graph analytics backend.
    pub base_url: Url,
    /// Chaos testing backend.
    pub resiliency_url: Url,
    pub anti_pattern_path: String,
}

/// Client for the analytics backends. Requests are plain GETs; there
/// is no retry, and failures are reported to the caller as is.
#[derive(Clone, Debug)]
pub struct GraphClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ClientConfig {
    pub fn new(base_url: &str, resiliency_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_url(base_url)?,
            resiliency_url: parse_url(resiliency_url)?,
            anti_pattern_path: ANTI_PATTERN_PATH.to_string(),
        })
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::InvalidUrl(format!("{base} + {path}: {e}")))
}

impl GraphClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(Error::BuildClient)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let name = url.to_string();
        log::debug!("GET {name} {query:?}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Request(name.clone(), e))?;
        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus(name, response.status()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(name, e))
    }

    /// Fetch the weighted dependency graph for a time window.
    pub async fn fetch_graph_data(
        &self,
        range: &TimeRange,
        weight_type: WeightType,
    ) -> Result<RawGraph> {
        let url = join(&self.config.base_url, WEIGHTED_GRAPH_PATH)?;
        let mut query = range.query_params();
        query.push(("weight_type", weight_type.to_string()));
        let response: WeightedGraphResponse = self.get(url.clone(), &query).await?;
        if !response.is_success() {
            return Err(Error::InvalidResponse(
                url.to_string(),
                response.status.unwrap_or_default(),
            ));
        }
        Ok(response.into_graph())
    }

    pub async fn weighted_graph(
        &self,
        range: &TimeRange,
        weight_type: WeightType,
    ) -> Result<CanonicalGraph> {
        Ok(normalize(&self.fetch_graph_data(range, weight_type).await?))
    }

    /// Fetch per-node or per-edge series with their change points.
    pub async fn fetch_change_point_graph(
        &self,
        range: &TimeRange,
        metric: MetricKey,
    ) -> Result<Vec<SeriesItem>> {
        let url = join(&self.config.base_url, CHANGE_POINTS_PATH)?;
        let mut query = range.query_params();
        query.push(("metric", metric.to_string()));
        let payload: ChangePointPayload = self.get(url, &query).await?;
        Ok(payload.into_items())
    }

    pub async fn change_point_table(
        &self,
        range: &TimeRange,
        metric: MetricKey,
    ) -> Result<AlignedTable> {
        align(&self.fetch_change_point_graph(range, metric).await?, metric)
    }

    pub async fn fetch_anti_pattern_graph(&self) -> Result<RawGraph> {
        let url = join(&self.config.base_url, &self.config.anti_pattern_path)?;
        let response: AntiPatternResponse = self.get(url, &[]).await?;
        Ok(response.into_graph())
    }

    pub async fn fetch_service_names(&self) -> Result<Vec<String>> {
        let url = join(&self.config.resiliency_url, SERVICE_NAMES_PATH)?;
        self.get(url, &[]).await
    }

    pub async fn fetch_resiliency_scores(&self, service: &str) -> Result<Vec<ResiliencyScore>> {
        let url = join(&self.config.resiliency_url, RESILIENCY_SCORE_PATH)?;
        let scores: Option<Vec<ResiliencyScore>> = self
            .get(url, &[("serviceName", service.to_string())])
            .await?;
        Ok(scores.unwrap_or_default())
    }
}
