//! Prometheus exporter for Nokia FastMile 5G gateways.
//!
//! Every scrape of the metrics endpoint fetches the gateway's JSON status
//! pages and republishes them as Prometheus metrics. Nothing is cached.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │     Gateway     │<────│   Collectors    │<────│   HTTP Server   │
//! │  (*.cgi JSON)   │     │ (gateway/radio/ │     │   (/metrics)    │
//! │                 │     │     network)    │     │                 │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! Run the exporter binary with a configuration file or a target:
//!
//! ```bash
//! ngw-exporter --config config.json5
//! ngw-exporter --target 192.168.12.1
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collectors;
pub mod config;
pub mod device;
pub mod error;
pub mod exposition;
pub mod http;
pub mod metric;
pub mod models;
pub mod registry;

pub use collectors::{Collector, enabled_collectors};
pub use config::ExporterConfig;
pub use device::DeviceClient;
pub use error::{CollectError, MetricError, ScrapeError};
pub use http::HttpServer;
pub use registry::{Registry, SharedRegistry};
