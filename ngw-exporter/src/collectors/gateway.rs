//! Gateway identity and uptime.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{Collector, descriptor, into_samples};
use crate::device::DeviceClient;
use crate::error::{CollectError, MetricError};
use crate::metric::{Descriptor, Observation, Sample};
use crate::models::GatewayInfo;

/// Gateway identity and uptime, one series per gateway unit.
pub struct GatewayInfoCollector {
    client: DeviceClient,

    uptime: Arc<Descriptor>,
    software_info: Arc<Descriptor>,
    hardware_info: Arc<Descriptor>,
}

impl GatewayInfoCollector {
    pub const NAME: &'static str = "gateway";

    /// Create a collector scraping gateway info through `client`.
    pub fn new(client: DeviceClient) -> Self {
        Self {
            client,

            uptime: descriptor(
                "gateway",
                "uptime_seconds",
                "How many seconds a gateway has been continuously powered on.",
                &["serial"],
            ),

            software_info: descriptor(
                "gateway",
                "software_info",
                "Gateway software information",
                &["serial", "version"],
            ),

            hardware_info: descriptor(
                "gateway",
                "hardware_info",
                "Gateway hardware information",
                &["serial", "name", "model", "version"],
            ),
        }
    }

    /// Derive observations from a decoded payload. One uptime counter and two
    /// info gauges per device entry.
    pub fn observe(&self, info: &GatewayInfo) -> Result<Vec<Observation>, MetricError> {
        let mut out = Vec::with_capacity(info.devices.len() * 3);

        for device in &info.devices {
            let serial = device.serial_number.as_str();

            out.push(Observation::counter(
                &self.uptime,
                device.uptime_seconds as f64,
                &[serial],
            )?);
            out.push(Observation::gauge(
                &self.software_info,
                1.0,
                &[serial, &device.software_version],
            )?);
            out.push(Observation::gauge(
                &self.hardware_info,
                1.0,
                &[
                    serial,
                    &info.model,
                    &device.product_class,
                    &device.hardware_version,
                ],
            )?);
        }

        Ok(out)
    }

    async fn scrape(&self) -> Result<Vec<Observation>, CollectError> {
        let info: GatewayInfo = self.client.scrape().await?;
        trace!(
            clients = info.clients.len(),
            active_clients = info.clients.iter().filter(|c| c.active != 0).count(),
            lte_links = info.link_lte.len(),
            nr_links = info.link_5g.len(),
            "Decoded gateway info"
        );
        Ok(self.observe(&info)?)
    }
}

#[async_trait]
impl Collector for GatewayInfoCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Box<dyn Iterator<Item = &Arc<Descriptor>> + '_> {
        Box::new([&self.uptime, &self.software_info, &self.hardware_info].into_iter())
    }

    async fn collect(&self) -> Vec<Sample> {
        into_samples(Self::NAME, self.client.target(), self.scrape().await)
    }
}
