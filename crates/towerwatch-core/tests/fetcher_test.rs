#![allow(clippy::unwrap_used)]
// FleetFetcher against a mock gateway.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use towerwatch_api::TransportConfig;
use towerwatch_core::{
    ControlCommand, FleetFetcher, GatewayConfig, SyntheticFleet, TowerId, TowerMonitor,
};

fn fetcher_for(server: &MockServer) -> FleetFetcher {
    let config = GatewayConfig::new(&server.uri(), false).unwrap();
    FleetFetcher::new(config, TransportConfig::default())
}

async fn mount_towers(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/towers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Live mode ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_all_towers_normalizes() {
    let server = MockServer::start().await;
    mount_towers(
        &server,
        json!([
            { "id": 2, "name": "Hill", "waterLevel": 140, "pumpOn": true, "online": true, "lastUpdate": 5 },
            { "id": 1, "level": -4, "pump": 0, "online": 1, "alarm": 1 }
        ]),
    )
    .await;

    let snapshot = fetcher_for(&server).fetch_all_towers().await.unwrap();

    let ids: Vec<TowerId> = snapshot.ids().collect();
    assert_eq!(ids, vec![TowerId(2), TowerId(1)]);

    let hill = snapshot.get(TowerId(2)).unwrap();
    assert_eq!(hill.water_level, 100);
    assert!(hill.pump_on);

    let bare = snapshot.get(TowerId(1)).unwrap();
    assert_eq!(bare.name, "Tower 1");
    assert_eq!(bare.water_level, 0);
    assert!(bare.low_water_alarm);
    assert!(bare.auto_mode);
}

#[tokio::test]
async fn test_duplicate_ids_are_decode_errors() {
    let server = MockServer::start().await;
    mount_towers(
        &server,
        json!([
            { "id": 1, "waterLevel": 10 },
            { "id": 1, "waterLevel": 20 }
        ]),
    )
    .await;

    let err = fetcher_for(&server).fetch_all_towers().await.unwrap_err();
    assert!(err.is_decode(), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_status().await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/towers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_all_towers().await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_fetch_tower_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tower/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tower = fetcher_for(&server).fetch_tower(TowerId(9)).await.unwrap();
    assert!(tower.is_none());
}

#[tokio::test]
async fn test_history_is_sorted_and_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .and(query_param("towerId", "3"))
        .and(query_param("hours", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "towerId": 3, "timestamp": 7_200_000, "waterLevel": 120, "pumpStatus": true },
            { "towerId": 3, "timestamp": 3_600_000, "waterLevel": 40, "pumpStatus": false }
        ])))
        .mount(&server)
        .await;

    let records = fetcher_for(&server).fetch_history(TowerId(3), 2).await.unwrap();
    let points: Vec<(i64, u8)> = records.iter().map(|r| (r.timestamp_ms, r.water_level)).collect();
    assert_eq!(points, vec![(3_600_000, 40), (7_200_000, 100)]);
}

#[tokio::test]
async fn test_address_change_switches_gateway() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_towers(&first, json!([{ "id": 1, "waterLevel": 10 }])).await;
    mount_towers(&second, json!([{ "id": 7, "waterLevel": 70 }])).await;

    let fetcher = fetcher_for(&first);
    let before = fetcher.fetch_all_towers().await.unwrap();
    assert!(before.contains(TowerId(1)));

    fetcher.config().set_base_address(&second.uri()).unwrap();
    let after = fetcher.fetch_all_towers().await.unwrap();
    assert!(after.contains(TowerId(7)));
    assert!(!after.contains(TowerId(1)));
}

#[tokio::test]
async fn test_pump_command_accepts_text_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pump"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let ack = fetcher_for(&server)
        .send_pump_command(ControlCommand::manual_pump(TowerId(2), false))
        .await
        .unwrap();
    assert_eq!(ack.get("message"), Some(&json!("OK")));
}

// ── Demo mode ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_synthetic_mode_never_touches_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = GatewayConfig::new(&server.uri(), true).unwrap();
    let fetcher = FleetFetcher::new(config, TransportConfig::default())
        .with_demo_fleet(SyntheticFleet::new(1_000));

    let snapshot = fetcher.fetch_all_towers().await.unwrap();
    assert_eq!(snapshot.len(), 5);
    assert_eq!(fetcher.fetch_status().await.unwrap().alarm_count, 2);
    assert_eq!(fetcher.fetch_tower(TowerId(4)).await.unwrap().unwrap().water_level, 96);
    assert_eq!(fetcher.fetch_history(TowerId(1), 24).await.unwrap().len(), 24);

    let ack = fetcher.send_mode_command(true).await.unwrap();
    assert_eq!(ack.get("synthetic"), Some(&json!(true)));
}

#[tokio::test]
async fn test_leaving_synthetic_mode_goes_live() {
    let server = MockServer::start().await;
    mount_towers(&server, json!([{ "id": 7, "waterLevel": 70 }])).await;

    let config = GatewayConfig::new(&server.uri(), true).unwrap();
    let fetcher = FleetFetcher::new(config, TransportConfig::default())
        .with_demo_fleet(SyntheticFleet::new(1_000));

    let demo = fetcher.fetch_all_towers().await.unwrap();
    assert_eq!(demo.to_vec(), fetcher.demo_fleet().towers());

    fetcher.config().set_synthetic(false);
    let live = fetcher.fetch_all_towers().await.unwrap();
    let ids: Vec<TowerId> = live.ids().collect();
    assert_eq!(ids, vec![TowerId(7)]);
}

#[tokio::test]
async fn test_repeated_synthetic_polls_are_unchanged() {
    let config = GatewayConfig::new("http://192.168.4.1", true).unwrap();
    let monitor = TowerMonitor::with_fetcher(
        FleetFetcher::new(config, TransportConfig::default()),
        std::time::Duration::from_secs(5),
    );

    let first = monitor.poller().refresh_now().await.unwrap();
    assert_eq!(first.update().unwrap().diff.inserted.len(), 5);

    let second = monitor.poller().refresh_now().await.unwrap();
    let update = second.update().unwrap();
    assert!(!update.diff.has_changes());
    assert_eq!(update.summary.online, 4);
    assert_eq!(update.summary.alarms, 2);
}
