//! Error types for scraping the device and building metrics.

use reqwest::StatusCode;
use thiserror::Error;

/// A failed device scrape.
///
/// All variants are local to one scrape; the next scrape starts fresh.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection, DNS or timeout failure, including failures while reading the body.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with something other than `200 OK`.
    #[error("scrape of {url} returned {status}")]
    HttpStatus { url: String, status: StatusCode },

    /// The body was not JSON of the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    /// Whether the request gave up because the scrape timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::Transport { source, .. } if source.is_timeout())
    }
}

/// Metric construction and registration errors.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("metric {metric} expects {expected} label values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid metric name: {0}")]
    InvalidMetricName(String),

    #[error("invalid label name {label:?} on metric {metric}")]
    InvalidLabelName { metric: String, label: String },

    #[error("metric {0} is already registered")]
    DuplicateMetric(String),

    #[error("collector {0} is already registered")]
    DuplicateCollector(String),

    /// Two observations of one metric carried the same label values.
    #[error("metric {metric} was collected twice with labels {labels}")]
    DuplicateSeries { metric: String, labels: String },
}

/// Why a collector produced its failure sample instead of metrics.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Metric(#[from] MetricError),
}
