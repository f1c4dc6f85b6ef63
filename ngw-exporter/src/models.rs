//! Typed views of the gateway's JSON status endpoints.
//!
//! Every record derives `Default` and is decoded with `#[serde(default)]`, so
//! fields the device omits take their zero value and fields it adds are
//! ignored. Signal values are kept exactly as the device reports them.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A device HTTP resource: path plus raw query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: &'static str,
}

impl Endpoint {
    /// Build the URL for this endpoint on `target` (a host or `host:port`).
    ///
    /// The `?` separator is only added when the query is non-empty.
    pub fn url(&self, target: &str) -> String {
        if self.query.is_empty() {
            format!("http://{}{}", target, self.path)
        } else {
            format!("http://{}{}?{}", target, self.path, self.query)
        }
    }
}

/// A payload served by one fixed device endpoint.
pub trait Model: DeserializeOwned + Default + Send + 'static {
    /// Where the device serves this payload.
    const ENDPOINT: Endpoint;
}

/// Gateway identity, returned from `/main_web_app.cgi`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayInfo {
    #[serde(rename = "gwmodel")]
    pub model: String,

    #[serde(rename = "device_app_status")]
    pub devices: Vec<DeviceStatus>,

    #[serde(rename = "device_cfg")]
    pub clients: Vec<ClientEntry>,

    #[serde(rename = "link_status_LTE")]
    pub link_lte: Vec<LinkStatus>,

    #[serde(rename = "link_status_5G")]
    pub link_5g: Vec<LinkStatus>,
}

impl Model for GatewayInfo {
    const ENDPOINT: Endpoint = Endpoint {
        path: "/main_web_app.cgi",
        query: "",
    };
}

/// Identity and uptime of one gateway unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DeviceStatus {
    pub hardware_version: String,
    pub product_class: String,
    pub software_version: String,
    pub serial_number: String,
    #[serde(rename = "UpTime")]
    pub uptime_seconds: i64,
}

/// A LAN client known to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ClientEntry {
    pub active: i64,
    pub address_source: String,
    pub interface_type: String,
}

/// State of one cellular link.
// The meaning of the linkStatus values is not documented by the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkStatus {
    #[serde(rename = "linkStatus")]
    pub status: String,
}

/// Cellular radio statistics, returned from `/fastmile_radio_status_web_app.cgi`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RadioStats {
    #[serde(rename = "cellular_stats")]
    pub cellular: Vec<CellularStats>,

    #[serde(rename = "cell_LTE_stats_cfg")]
    pub stats_lte: Vec<BandStatsEntry>,

    #[serde(rename = "cell_5G_stats_cfg")]
    pub stats_5g: Vec<BandStatsEntry>,
}

impl Model for RadioStats {
    const ENDPOINT: Endpoint = Endpoint {
        path: "/fastmile_radio_status_web_app.cgi",
        query: "",
    };
}

/// Cumulative cellular traffic counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CellularStats {
    pub bytes_received: i64,
    pub bytes_sent: i64,
}

/// One entry of the per-band statistics lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BandStatsEntry {
    #[serde(rename = "stat")]
    pub stats: BandStats,
}

/// Per-band signal block, shared by the LTE and 5G lists.
///
/// Only one of the two downlink channel fields is filled in, depending on
/// which list the block came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BandStats {
    #[serde(rename = "Band")]
    pub band: String,
    #[serde(rename = "PhysicalCellID")]
    pub cell_id: i64,
    #[serde(rename = "DownlinkEarfcn")]
    pub downlink_lte: i64,
    #[serde(rename = "Downlink_NR_ARFCN")]
    pub downlink_5g: i64,
    #[serde(rename = "RSRPCurrent")]
    pub rsrp: i64,
    #[serde(rename = "RSRPStrengthIndexCurrent")]
    pub rsrp_strength: i64,
    #[serde(rename = "RSRQCurrent")]
    pub rsrq: i64,
    #[serde(rename = "RSSICurrent")]
    pub rssi: i64,
    #[serde(rename = "SNRCurrent")]
    pub snr: i64,
}

/// LAN and WLAN statistics, returned from `/lan_status_web_app.cgi?lan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkStats {
    #[serde(rename = "lan_ifip")]
    pub router: RouterInterface,

    #[serde(rename = "wlan_status_glb")]
    pub wlan: Vec<WlanStatus>,

    #[serde(rename = "lan_ether")]
    pub lan: Vec<LanPort>,
}

impl Model for NetworkStats {
    const ENDPOINT: Endpoint = Endpoint {
        path: "/lan_status_web_app.cgi",
        query: "lan",
    };
}

/// The gateway's own LAN interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterInterface {
    #[serde(rename = "Enable")]
    pub enabled: i64,
    #[serde(rename = "IPInterfaceIPAddress")]
    pub ip_address: String,
    #[serde(rename = "IPInterfaceSubnetMask")]
    pub subnet_mask: String,
}

/// One wireless network with its radio state and counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WlanStatus {
    #[serde(rename = "RadioEnabled")]
    pub radio_enabled: i64,
    #[serde(rename = "Enable")]
    pub network_enabled: i64,
    #[serde(rename = "SSID")]
    pub ssid: String,
    #[serde(rename = "Channel")]
    pub channel: i64,
    #[serde(rename = "TotalBytesSent")]
    pub bytes_sent: i64,
    #[serde(rename = "TotalBytesReceived")]
    pub bytes_received: i64,
    #[serde(rename = "TotalPacketsSent")]
    pub packets_sent: i64,
    #[serde(rename = "TotalPacketsReceived")]
    pub packets_received: i64,
    #[serde(rename = "TotalAssociations")]
    pub associations: i64,
    #[serde(rename = "X_CT_COM_PowerValue")]
    pub power_value: i64,
    #[serde(rename = "X_CT_COM_Powerlevel")]
    pub power_level: i64,
    #[serde(rename = "TransmitPower")]
    pub transmit_power: i64,
    #[serde(rename = "X_ASB_COM_RxErrors")]
    pub rx_errors: i64,
    #[serde(rename = "X_ASB_COM_RxDrops")]
    pub rx_drops: i64,
    #[serde(rename = "X_ASB_COM_TxErrors")]
    pub tx_errors: i64,
    #[serde(rename = "X_ASB_COM_TxDrops")]
    pub tx_drops: i64,
}

/// One wired LAN port with its link state and counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanPort {
    #[serde(rename = "Enable")]
    pub enabled: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "MACAddress")]
    pub mac_address: String,
    #[serde(rename = "MaxBitRate")]
    pub max_bit_rate: String,
    #[serde(rename = "DuplexMode")]
    pub duplex_mode: String,
    #[serde(rename = "stat")]
    pub stats: LanPortStats,
}

/// Cumulative per-port counters since device boot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LanPortStats {
    pub bytes_sent: i64,
    pub bytes_received: i64,
    pub packets_sent: i64,
    pub packets_received: i64,
    #[serde(rename = "ErrorsSent")]
    pub tx_errors: i64,
    #[serde(rename = "ErrorsReceived")]
    pub rx_errors: i64,
    pub unicast_packets_sent: i64,
    pub unicast_packets_received: i64,
    pub discard_packets_sent: i64,
    pub discard_packets_received: i64,
    pub multicast_packets_sent: i64,
    pub multicast_packets_received: i64,
    pub broadcast_packets_sent: i64,
    pub broadcast_packets_received: i64,
    pub unknown_proto_packets_received: i64,
}
