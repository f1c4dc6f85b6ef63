//! End-to-end tests against a mock gateway served by axum on a loopback port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;

use ngw_exporter::collectors::{
    Collector, GatewayInfoCollector, NetworkStatsCollector, RadioStatsCollector,
};
use ngw_exporter::config::{CollectorsConfig, ErrorHandling};
use ngw_exporter::error::{CollectError, ScrapeError};
use ngw_exporter::metric::Sample;
use ngw_exporter::models::{GatewayInfo, NetworkStats, RadioStats};
use ngw_exporter::{DeviceClient, ExporterConfig, HttpServer, Registry, enabled_collectors};

const GATEWAY_INFO: &str = include_str!("fixtures/gateway_info.json");
const RADIO_STATS: &str = include_str!("fixtures/radio_stats.json");
const NETWORK_STATS: &str = include_str!("fixtures/network_stats.json");

fn json(body: &'static str) -> Response {
    (StatusCode::OK, [("content-type", "application/json")], body).into_response()
}

async fn lan_status(RawQuery(query): RawQuery) -> Response {
    if query.as_deref() == Some("lan") {
        json(NETWORK_STATS)
    } else {
        (StatusCode::BAD_REQUEST, "missing lan query").into_response()
    }
}

fn healthy_device() -> Router {
    Router::new()
        .route("/main_web_app.cgi", get(|| async { json(GATEWAY_INFO) }))
        .route(
            "/fastmile_radio_status_web_app.cgi",
            get(|| async { json(RADIO_STATS) }),
        )
        .route("/lan_status_web_app.cgi", get(lan_status))
}

async fn spawn_device(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> DeviceClient {
    DeviceClient::new(addr.to_string(), Duration::from_secs(2))
}

fn single_error(samples: Vec<Sample>) -> CollectError {
    assert_eq!(
        samples.len(),
        1,
        "a failed scrape yields exactly one sample"
    );
    match samples.into_iter().next() {
        Some(Sample::Invalid { error, .. }) => error,
        other => panic!("expected invalid sample, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_decodes_all_endpoints() {
    let addr = spawn_device(healthy_device()).await;
    let client = client(addr);

    let info: GatewayInfo = client.scrape().await.unwrap();
    assert_eq!(info.model, "5G21");
    assert_eq!(info.devices[0].serial_number, "ABC123");

    let radio: RadioStats = client.scrape().await.unwrap();
    assert_eq!(radio.cellular.len(), 2);
    assert_eq!(radio.stats_5g[0].stats.downlink_5g, 126490);

    // Only served with the `lan` query string.
    let network: NetworkStats = client.scrape().await.unwrap();
    assert_eq!(network.lan.len(), 4);
    assert_eq!(network.wlan.len(), 3);
}

#[tokio::test]
async fn test_collectors_against_device() {
    let addr = spawn_device(healthy_device()).await;
    let client = client(addr);

    let gateway = GatewayInfoCollector::new(client.clone()).collect().await;
    assert_eq!(gateway.len(), 3);
    assert!(gateway.iter().all(|s| !s.is_invalid()));

    let radio = RadioStatsCollector::new(client.clone()).collect().await;
    assert_eq!(radio.len(), 2 + 6 * 2);

    let network = NetworkStatsCollector::new(client).collect().await;
    assert_eq!(network.len(), 7 * 3 + 9);
}

#[tokio::test]
async fn test_http_status_error() {
    let router = Router::new().route(
        "/main_web_app.cgi",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
    );
    let addr = spawn_device(router).await;

    let samples = GatewayInfoCollector::new(client(addr)).collect().await;
    match single_error(samples) {
        CollectError::Scrape(ScrapeError::HttpStatus { status, url }) => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert!(url.ends_with("/main_web_app.cgi"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_missing_endpoint_is_http_status_error() {
    let addr = spawn_device(Router::new()).await;

    let samples = RadioStatsCollector::new(client(addr)).collect().await;
    assert!(matches!(
        single_error(samples),
        CollectError::Scrape(ScrapeError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            ..
        })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let router = Router::new().route(
        "/lan_status_web_app.cgi",
        get(|| async { json("{\"lan_ether\": [") }),
    );
    let addr = spawn_device(router).await;

    let samples = NetworkStatsCollector::new(client(addr)).collect().await;
    assert!(matches!(
        single_error(samples),
        CollectError::Scrape(ScrapeError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_type_mismatch_is_decode_error() {
    let router = Router::new().route(
        "/main_web_app.cgi",
        get(|| async { json(r#"{"device_app_status": [{"UpTime": "soon"}]}"#) }),
    );
    let addr = spawn_device(router).await;

    let result = client(addr).scrape::<GatewayInfo>().await;
    assert!(matches!(result, Err(ScrapeError::Decode { .. })));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let samples = GatewayInfoCollector::new(client(addr)).collect().await;
    let error = single_error(samples);
    assert!(matches!(
        error,
        CollectError::Scrape(ScrapeError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_slow_device_times_out() {
    let router = Router::new().route(
        "/fastmile_radio_status_web_app.cgi",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            json(RADIO_STATS)
        }),
    );
    let addr = spawn_device(router).await;
    let client = DeviceClient::new(addr.to_string(), Duration::from_millis(200));

    let error = client.scrape::<RadioStats>().await.unwrap_err();
    assert!(error.is_timeout(), "expected timeout, got {}", error);
}

#[tokio::test]
async fn test_registry_renders_device_metrics() {
    let addr = spawn_device(healthy_device()).await;

    let mut registry = Registry::new();
    for collector in enabled_collectors(&client(addr), &CollectorsConfig::default()) {
        registry.register(collector).unwrap();
    }

    let gathered = registry.gather().await;
    assert!(!gathered.has_errors());

    let body = gathered.render();
    for line in [
        "ngw_gateway_uptime_seconds{serial=\"ABC123\"} 3600\n",
        "ngw_gateway_software_info{serial=\"ABC123\",version=\"1.2.3\"} 1\n",
        "ngw_gateway_hardware_info{serial=\"ABC123\",name=\"5G21\",model=\"FastmileX\",version=\"rev2\"} 1\n",
        "ngw_radio_receive_bytes_total 1500\n",
        "ngw_radio_transmit_bytes_total 250\n",
        "ngw_radio_downlink_channel{type=\"LTE\",band=\"B66\"} 66786\n",
        "ngw_radio_downlink_channel{type=\"5G\",band=\"n71\"} 126490\n",
        "ngw_radio_rsrp{type=\"5G\",band=\"n71\"} -90\n",
        "ngw_network_lan_port_link_up{port=\"1\"} 1\n",
        "ngw_network_lan_port_link_up{port=\"4\"} 0\n",
        "ngw_network_wlan_associations{ssid=\"Home\",channel=\"36\"} 3\n",
        "ngw_exporter_collector_success{collector=\"network\"} 1\n",
        "# TYPE ngw_gateway_uptime_seconds counter\n",
        "# TYPE ngw_radio_rsrp gauge\n",
    ] {
        assert!(body.contains(line), "missing {:?} in:\n{}", line, body);
    }

    // Disabled port 3 and the disabled WLANs never show up.
    assert!(!body.contains("port=\"3\""));
    assert!(!body.contains("Guest"));
    assert!(!body.contains("channel=\"6\""));
}

async fn serve_exporter(
    device: SocketAddr,
    error_handling: ErrorHandling,
) -> (SocketAddr, watch::Sender<bool>) {
    let mut registry = Registry::new();
    for collector in enabled_collectors(&client(device), &CollectorsConfig::default()) {
        registry.register(collector).unwrap();
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);

    let server = HttpServer::new(
        Arc::new(registry),
        addr,
        "/metrics".to_string(),
        error_handling,
    );
    tokio::spawn(server.serve(listener, rx));

    (addr, tx)
}

#[tokio::test]
async fn test_exporter_endpoint_policies() {
    // Radio endpoint missing: one collector fails on every scrape.
    let device = spawn_device(
        Router::new()
            .route("/main_web_app.cgi", get(|| async { json(GATEWAY_INFO) }))
            .route("/lan_status_web_app.cgi", get(lan_status)),
    )
    .await;

    let (fail_addr, fail_tx) = serve_exporter(device, ErrorHandling::Fail).await;
    let response = reqwest::get(format!("http://{}/metrics", fail_addr))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await.unwrap();
    assert!(body.contains("[from collector \"radio\"]"), "{}", body);

    let (cont_addr, cont_tx) = serve_exporter(device, ErrorHandling::Continue).await;
    let response = reqwest::get(format!("http://{}/metrics", cont_addr))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("ngw_gateway_uptime_seconds{serial=\"ABC123\"} 3600\n"));
    assert!(body.contains("ngw_exporter_collector_success{collector=\"radio\"} 0\n"));
    assert!(!body.contains("ngw_radio_rsrp"));

    let ready = reqwest::get(format!("http://{}/ready", cont_addr))
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    fail_tx.send(true).unwrap();
    cont_tx.send(true).unwrap();
}

#[tokio::test]
async fn test_identical_wlans_fail_the_scrape() {
    let router = Router::new().route(
        "/lan_status_web_app.cgi",
        get(|| async {
            json(
                r#"{"wlan_status_glb": [
                    {"RadioEnabled": 1, "Enable": 1, "SSID": "Home", "Channel": 36, "TotalAssociations": 2},
                    {"RadioEnabled": 1, "Enable": 1, "SSID": "Home", "Channel": 36, "TotalAssociations": 5}
                ]}"#,
            )
        }),
    );
    let device = spawn_device(router).await;

    let mut registry = Registry::new();
    registry
        .register(Box::new(NetworkStatsCollector::new(client(device))))
        .unwrap();
    let registry = Arc::new(registry);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);
    let server = HttpServer::new(registry, addr, "/metrics".to_string(), ErrorHandling::Fail);
    tokio::spawn(server.serve(listener, rx));

    let response = reqwest::get(format!("http://{}/metrics", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await.unwrap();
    assert!(body.contains("[from collector \"network\"]"), "{}", body);
    assert!(
        body.contains("ngw_network_wlan_associations was collected twice"),
        "{}",
        body
    );

    tx.send(true).unwrap();
}

#[tokio::test]
async fn test_config_file_round_trip_into_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ngw.json5");
    std::fs::write(
        &path,
        r#"{
            // gateway on the default LAN
            device: { target: "192.168.12.1", scrape_timeout_secs: 4 },
            collectors: { radio: false },
        }"#,
    )
    .unwrap();

    let config = ExporterConfig::load_from_file(&path).unwrap();
    config.validate().unwrap();

    let client = DeviceClient::new(config.device.target.clone(), config.device.scrape_timeout());
    assert_eq!(client.timeout(), Duration::from_secs(4));

    let names: Vec<_> = enabled_collectors(&client, &config.collectors)
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(names, vec!["gateway", "network"]);
}
