//! Cellular radio throughput and per-band signal quality.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{Collector, descriptor, into_samples};
use crate::device::DeviceClient;
use crate::error::{CollectError, MetricError};
use crate::metric::{Descriptor, Observation, Sample};
use crate::models::{BandStats, RadioStats};

const LTE: &str = "LTE";
const NR: &str = "5G";

/// Cellular traffic counters and per-band signal quality.
pub struct RadioStatsCollector {
    client: DeviceClient,

    receive_bytes: Arc<Descriptor>,
    transmit_bytes: Arc<Descriptor>,

    cell_id: Arc<Descriptor>,
    downlink_channel: Arc<Descriptor>,
    rsrp: Arc<Descriptor>,
    rsrq: Arc<Descriptor>,
    rssi: Arc<Descriptor>,
    snr: Arc<Descriptor>,
}

impl RadioStatsCollector {
    pub const NAME: &'static str = "radio";

    /// Create a collector scraping radio statistics through `client`.
    pub fn new(client: DeviceClient) -> Self {
        let band_labels = &["type", "band"];

        Self {
            client,

            receive_bytes: descriptor(
                "radio",
                "receive_bytes_total",
                "How many bytes have been received by the cellular radio",
                &[],
            ),
            transmit_bytes: descriptor(
                "radio",
                "transmit_bytes_total",
                "How many bytes have been transmitted by the cellular radio",
                &[],
            ),

            cell_id: descriptor("radio", "cell_id", "Physical cell identifier", band_labels),
            downlink_channel: descriptor(
                "radio",
                "downlink_channel",
                "Cellular channel number",
                band_labels,
            ),
            rsrp: descriptor(
                "radio",
                "rsrp",
                "Cellular reference signal RX power",
                band_labels,
            ),
            rsrq: descriptor(
                "radio",
                "rsrq",
                "Cellular reference signal RX quality",
                band_labels,
            ),
            rssi: descriptor(
                "radio",
                "rssi",
                "Cellular received signal strength indicator",
                band_labels,
            ),
            snr: descriptor(
                "radio",
                "snr",
                "Cellular signal to noise ratio",
                band_labels,
            ),
        }
    }

    /// Derive observations from a decoded payload.
    ///
    /// Byte counters are summed over all cellular entries. Band gauges are
    /// emitted per entry, with the generation label and downlink field chosen
    /// by the list the entry came from.
    pub fn observe(&self, stats: &RadioStats) -> Result<Vec<Observation>, MetricError> {
        let bands = stats.stats_lte.len() + stats.stats_5g.len();
        let mut out = Vec::with_capacity(2 + bands * 6);

        let received: i128 = stats
            .cellular
            .iter()
            .map(|c| i128::from(c.bytes_received))
            .sum();
        let sent: i128 = stats
            .cellular
            .iter()
            .map(|c| i128::from(c.bytes_sent))
            .sum();

        out.push(Observation::counter(
            &self.receive_bytes,
            received as f64,
            &[],
        )?);
        out.push(Observation::counter(
            &self.transmit_bytes,
            sent as f64,
            &[],
        )?);

        for entry in &stats.stats_lte {
            self.observe_band(&mut out, LTE, entry.stats.downlink_lte, &entry.stats)?;
        }

        for entry in &stats.stats_5g {
            self.observe_band(&mut out, NR, entry.stats.downlink_5g, &entry.stats)?;
        }

        Ok(out)
    }

    fn observe_band(
        &self,
        out: &mut Vec<Observation>,
        generation: &str,
        downlink: i64,
        band: &BandStats,
    ) -> Result<(), MetricError> {
        let labels = [generation, band.band.as_str()];

        out.push(Observation::gauge(
            &self.downlink_channel,
            downlink as f64,
            &labels,
        )?);
        out.push(Observation::gauge(
            &self.cell_id,
            band.cell_id as f64,
            &labels,
        )?);
        out.push(Observation::gauge(&self.rsrp, band.rsrp as f64, &labels)?);
        out.push(Observation::gauge(&self.rsrq, band.rsrq as f64, &labels)?);
        out.push(Observation::gauge(&self.rssi, band.rssi as f64, &labels)?);
        out.push(Observation::gauge(&self.snr, band.snr as f64, &labels)?);

        Ok(())
    }

    async fn scrape(&self) -> Result<Vec<Observation>, CollectError> {
        let stats: RadioStats = self.client.scrape().await?;
        for entry in stats.stats_lte.iter().chain(&stats.stats_5g) {
            trace!(
                band = %entry.stats.band,
                rsrp_strength = entry.stats.rsrp_strength,
                "Decoded band stats"
            );
        }
        Ok(self.observe(&stats)?)
    }
}

#[async_trait]
impl Collector for RadioStatsCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Box<dyn Iterator<Item = &Arc<Descriptor>> + '_> {
        Box::new(
            [
                &self.receive_bytes,
                &self.transmit_bytes,
                &self.cell_id,
                &self.downlink_channel,
                &self.rsrp,
                &self.rsrq,
                &self.rssi,
                &self.snr,
            ]
            .into_iter(),
        )
    }

    async fn collect(&self) -> Vec<Sample> {
        into_samples(Self::NAME, self.client.target(), self.scrape().await)
    }
}
