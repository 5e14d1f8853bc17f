/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use crate::{ids::EntityKey, metrics::MetricKey};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("unknown weight type: {0}")]
    UnknownWeightType(String),
    #[error("{metric} is a {} metric, but {entity} is a {} series", .metric.scope(), .entity.scope())]
    MetricScopeMismatch { metric: MetricKey, entity: EntityKey },
    #[error("invalid entity key: {0}")]
    InvalidEntityKey(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
    #[cfg(feature = "client")]
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[cfg(feature = "client")]
    #[error("failed to build http client: {0}")]
    BuildClient(reqwest::Error),
    #[cfg(feature = "client")]
    #[error("request to {0} failed: {1}")]
    Request(String, reqwest::Error),
    #[cfg(feature = "client")]
    #[error("request to {0} returned {1}")]
    UnexpectedStatus(String, reqwest::StatusCode),
    #[cfg(feature = "client")]
    #[error("failed to decode response from {0}: {1}")]
    Decode(String, reqwest::Error),
    #[cfg(feature = "client")]
    #[error("invalid response from {0}: status {1:?}")]
    InvalidResponse(String, String),
}

impl Error {
    /// Whether the error originates from the network layer rather than
    /// from the transformations themselves.
    pub fn is_network_failure(&self) -> bool {
        match self {
            #[cfg(feature = "client")]
            Self::BuildClient(_)
            | Self::Request(_, _)
            | Self::UnexpectedStatus(_, _)
            | Self::Decode(_, _)
            | Self::InvalidResponse(_, _) => true,
            _ => false,
        }
    }
}
