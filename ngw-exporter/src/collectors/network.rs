//! LAN port and WLAN network statistics.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{Collector, descriptor, into_samples};
use crate::device::DeviceClient;
use crate::error::{CollectError, MetricError};
use crate::metric::{Descriptor, Observation, Sample};
use crate::models::{LanPort, NetworkStats, WlanStatus};

/// Link state string the device reports for a connected port.
const LINK_UP: &str = "Up";

/// Per-port LAN and per-network WLAN statistics.
pub struct NetworkStatsCollector {
    client: DeviceClient,

    // LAN
    lan_port_up: Arc<Descriptor>,
    lan_transmit_bytes: Arc<Descriptor>,
    lan_receive_bytes: Arc<Descriptor>,
    lan_transmit_packets: Arc<Descriptor>,
    lan_receive_packets: Arc<Descriptor>,
    lan_transmit_errors: Arc<Descriptor>,
    lan_receive_errors: Arc<Descriptor>,

    // WLAN
    wlan_associations: Arc<Descriptor>,
    wlan_transmit_bytes: Arc<Descriptor>,
    wlan_receive_bytes: Arc<Descriptor>,
    wlan_transmit_packets: Arc<Descriptor>,
    wlan_receive_packets: Arc<Descriptor>,
    wlan_transmit_errors: Arc<Descriptor>,
    wlan_receive_errors: Arc<Descriptor>,
    wlan_transmit_drops: Arc<Descriptor>,
    wlan_receive_drops: Arc<Descriptor>,
}

impl NetworkStatsCollector {
    pub const NAME: &'static str = "network";

    /// Create a collector scraping LAN and WLAN statistics through `client`.
    pub fn new(client: DeviceClient) -> Self {
        let port = &["port"];
        let wlan = &["ssid", "channel"];

        Self {
            client,

            lan_port_up: descriptor(
                "network",
                "lan_port_link_up",
                "Whether this LAN port has a link",
                port,
            ),
            lan_transmit_bytes: descriptor(
                "network",
                "lan_transmit_bytes_total",
                "Number of transmitted bytes",
                port,
            ),
            lan_receive_bytes: descriptor(
                "network",
                "lan_receive_bytes_total",
                "Number of received bytes",
                port,
            ),
            lan_transmit_packets: descriptor(
                "network",
                "lan_transmit_packets_total",
                "Number of transmitted packets",
                port,
            ),
            lan_receive_packets: descriptor(
                "network",
                "lan_receive_packets_total",
                "Number of received packets",
                port,
            ),
            lan_transmit_errors: descriptor(
                "network",
                "lan_transmit_errors_total",
                "Number of TX errors",
                port,
            ),
            lan_receive_errors: descriptor(
                "network",
                "lan_receive_errors_total",
                "Number of RX errors",
                port,
            ),

            wlan_associations: descriptor(
                "network",
                "wlan_associations",
                "Number of actively associated stations",
                wlan,
            ),
            wlan_transmit_bytes: descriptor(
                "network",
                "wlan_transmit_bytes_total",
                "Number of transmitted bytes",
                wlan,
            ),
            wlan_receive_bytes: descriptor(
                "network",
                "wlan_receive_bytes_total",
                "Number of received bytes",
                wlan,
            ),
            wlan_transmit_packets: descriptor(
                "network",
                "wlan_transmit_packets_total",
                "Number of transmitted packets",
                wlan,
            ),
            wlan_receive_packets: descriptor(
                "network",
                "wlan_receive_packets_total",
                "Number of received packets",
                wlan,
            ),
            wlan_transmit_errors: descriptor(
                "network",
                "wlan_transmit_errors_total",
                "Number of TX errors",
                wlan,
            ),
            wlan_receive_errors: descriptor(
                "network",
                "wlan_receive_errors_total",
                "Number of RX errors",
                wlan,
            ),
            wlan_transmit_drops: descriptor(
                "network",
                "wlan_transmit_drops_total",
                "Number of TX drops",
                wlan,
            ),
            wlan_receive_drops: descriptor(
                "network",
                "wlan_receive_drops_total",
                "Number of RX drops",
                wlan,
            ),
        }
    }

    /// Derive observations from a decoded payload.
    ///
    /// Disabled LAN ports and WLANs whose radio or network is disabled are
    /// skipped entirely. LAN ports are labelled by their 1-based position in
    /// the device's list, so skipping a port does not renumber the others.
    pub fn observe(&self, stats: &NetworkStats) -> Result<Vec<Observation>, MetricError> {
        let mut out = Vec::new();

        for (index, lan) in stats.lan.iter().enumerate() {
            if lan.enabled == 0 {
                continue;
            }
            self.observe_lan(&mut out, index + 1, lan)?;
        }

        for wlan in &stats.wlan {
            if wlan.radio_enabled == 0 || wlan.network_enabled == 0 {
                continue;
            }
            self.observe_wlan(&mut out, wlan)?;
        }

        Ok(out)
    }

    fn observe_lan(
        &self,
        out: &mut Vec<Observation>,
        port: usize,
        lan: &LanPort,
    ) -> Result<(), MetricError> {
        let port = port.to_string();
        let labels = [port.as_str()];
        let link_up = if lan.status == LINK_UP { 1.0 } else { 0.0 };
        let s = &lan.stats;

        out.push(Observation::gauge(&self.lan_port_up, link_up, &labels)?);
        out.push(Observation::counter(
            &self.lan_transmit_bytes,
            s.bytes_sent as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.lan_receive_bytes,
            s.bytes_received as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.lan_transmit_packets,
            s.packets_sent as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.lan_receive_packets,
            s.packets_received as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.lan_transmit_errors,
            s.tx_errors as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.lan_receive_errors,
            s.rx_errors as f64,
            &labels,
        )?);

        Ok(())
    }

    fn observe_wlan(
        &self,
        out: &mut Vec<Observation>,
        wlan: &WlanStatus,
    ) -> Result<(), MetricError> {
        let channel = wlan.channel.to_string();
        let labels = [wlan.ssid.as_str(), channel.as_str()];

        out.push(Observation::gauge(
            &self.wlan_associations,
            wlan.associations as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_transmit_bytes,
            wlan.bytes_sent as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_receive_bytes,
            wlan.bytes_received as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_transmit_packets,
            wlan.packets_sent as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_receive_packets,
            wlan.packets_received as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_transmit_errors,
            wlan.tx_errors as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_receive_errors,
            wlan.rx_errors as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_transmit_drops,
            wlan.tx_drops as f64,
            &labels,
        )?);
        out.push(Observation::counter(
            &self.wlan_receive_drops,
            wlan.rx_drops as f64,
            &labels,
        )?);

        Ok(())
    }

    async fn scrape(&self) -> Result<Vec<Observation>, CollectError> {
        let stats: NetworkStats = self.client.scrape().await?;
        trace!(
            router_enabled = stats.router.enabled,
            router_ip = %stats.router.ip_address,
            lan_ports = stats.lan.len(),
            wlans = stats.wlan.len(),
            "Decoded network stats"
        );
        Ok(self.observe(&stats)?)
    }
}

#[async_trait]
impl Collector for NetworkStatsCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Box<dyn Iterator<Item = &Arc<Descriptor>> + '_> {
        Box::new(
            [
                &self.lan_port_up,
                &self.lan_transmit_bytes,
                &self.lan_receive_bytes,
                &self.lan_transmit_packets,
                &self.lan_receive_packets,
                &self.lan_transmit_errors,
                &self.lan_receive_errors,
                &self.wlan_associations,
                &self.wlan_transmit_bytes,
                &self.wlan_receive_bytes,
                &self.wlan_transmit_packets,
                &self.wlan_receive_packets,
                &self.wlan_transmit_errors,
                &self.wlan_receive_errors,
                &self.wlan_transmit_drops,
                &self.wlan_receive_drops,
            ]
            .into_iter(),
        )
    }

    async fn collect(&self) -> Vec<Sample> {
        into_samples(Self::NAME, self.client.target(), self.scrape().await)
    }
}
