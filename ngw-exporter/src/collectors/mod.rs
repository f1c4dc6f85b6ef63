//! On-demand collectors, one per device endpoint.
//!
//! Each collector owns the descriptors of its metric group, built once at
//! construction. A `collect()` call performs exactly one device scrape and
//! turns the decoded payload into observations. When the scrape fails, the
//! only sample returned is the invalid sentinel carrying the error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::CollectorsConfig;
use crate::device::DeviceClient;
use crate::error::CollectError;
use crate::metric::{Descriptor, NAMESPACE, Observation, Sample, build_fq_name};

pub mod gateway;
pub mod network;
pub mod radio;

pub use gateway::GatewayInfoCollector;
pub use network::NetworkStatsCollector;
pub use radio::RadioStatsCollector;

/// A metric group scraped independently on every registry pull.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs and the exporter's own metrics.
    fn name(&self) -> &'static str;

    /// The descriptors this collector can emit, in a stable order. Never does I/O.
    fn describe(&self) -> Box<dyn Iterator<Item = &Arc<Descriptor>> + '_>;

    /// Scrape the device once and return the resulting samples.
    async fn collect(&self) -> Vec<Sample>;
}

/// Create the collectors enabled in `config`, all scraping through `client`.
pub fn enabled_collectors(
    client: &DeviceClient,
    config: &CollectorsConfig,
) -> Vec<Box<dyn Collector>> {
    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();
    if config.gateway {
        collectors.push(Box::new(GatewayInfoCollector::new(client.clone())));
    }
    if config.radio {
        collectors.push(Box::new(RadioStatsCollector::new(client.clone())));
    }
    if config.network {
        collectors.push(Box::new(NetworkStatsCollector::new(client.clone())));
    }
    collectors
}

fn descriptor(subsystem: &str, name: &str, help: &str, labels: &[&str]) -> Arc<Descriptor> {
    Arc::new(Descriptor::new(
        build_fq_name(NAMESPACE, subsystem, name),
        help,
        labels,
    ))
}

/// Turn the outcome of one scrape into samples, logging failures.
fn into_samples(
    collector: &'static str,
    target: &str,
    result: Result<Vec<Observation>, CollectError>,
) -> Vec<Sample> {
    match result {
        Ok(observations) => {
            debug!(
                collector,
                device = %target,
                samples = observations.len(),
                "Collected device metrics"
            );
            observations.into_iter().map(Sample::Valid).collect()
        }
        Err(error) => {
            warn!(collector, device = %target, error = %error, "Failed to collect device metrics");
            vec![Sample::Invalid { collector, error }]
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MetricError, ScrapeError};
    use reqwest::StatusCode;
    use std::collections::HashSet;
    use std::time::Duration;

    fn client() -> DeviceClient {
        DeviceClient::new("192.0.2.1", Duration::from_secs(1))
    }

    #[test]
    fn test_enabled_collectors() {
        let all = enabled_collectors(&client(), &CollectorsConfig::default());
        let names: Vec<_> = all.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["gateway", "radio", "network"]);

        let only_radio = CollectorsConfig {
            gateway: false,
            radio: true,
            network: false,
        };
        let some = enabled_collectors(&client(), &only_radio);
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].name(), "radio");
    }

    #[test]
    fn test_metric_names_unique_across_collectors() {
        let collectors = enabled_collectors(&client(), &CollectorsConfig::default());
        let mut seen = HashSet::new();

        for collector in &collectors {
            for desc in collector.describe() {
                assert!(desc.fq_name().starts_with("ngw_"));
                assert!(desc.validate().is_ok(), "{} is invalid", desc.fq_name());
                assert!(
                    seen.insert(desc.fq_name().to_string()),
                    "{} collides",
                    desc.fq_name()
                );
            }
        }

        assert_eq!(seen.len(), 3 + 8 + 16);
    }

    #[test]
    fn test_into_samples_success() {
        let desc = descriptor("test", "thing", "help", &[]);
        let obs = Observation::gauge(&desc, 2.0, &[]).unwrap();

        let samples = into_samples("test", "192.0.2.1", Ok(vec![obs.clone(), obs]));
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| !s.is_invalid()));
    }

    #[test]
    fn test_into_samples_failure_is_single_sentinel() {
        let error = CollectError::Scrape(ScrapeError::HttpStatus {
            url: "http://192.0.2.1/main_web_app.cgi".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        });

        let samples = into_samples("gateway", "192.0.2.1", Err(error));
        assert_eq!(samples.len(), 1);
        match &samples[0] {
            Sample::Invalid { collector, error } => {
                assert_eq!(*collector, "gateway");
                assert!(error.to_string().contains("503"));
            }
            Sample::Valid(_) => panic!("expected invalid sample"),
        }
    }

    #[test]
    fn test_into_samples_metric_error() {
        let error = CollectError::Metric(MetricError::LabelCardinality {
            metric: "ngw_test".to_string(),
            expected: 1,
            got: 0,
        });

        let samples = into_samples("test", "192.0.2.1", Err(error));
        assert_eq!(samples.len(), 1);
        assert!(samples[0].is_invalid());
    }
}
