#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::extract::ws::Message;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::timeout;

use oscrelay_core::protocol::hid::{HidEvent, HidSendFilter, MouseAction, MouseButton, DEFAULT_PREFIX};
use oscrelay_core::protocol::osc::OscArg;
use oscrelay_gateway::app_state::{AppState, StateOptions};
use oscrelay_gateway::config::{ConfigPatch, RelayConfig};
use oscrelay_gateway::realtime::Connection;
use oscrelay_gateway::sender::OscSender;

const WAIT: Duration = Duration::from_secs(3);

fn loopback_opts() -> StateOptions {
    StateOptions {
        config_path: None,
        osc_bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        bind_retry: Duration::from_millis(50),
    }
}

fn enabled_on(port: u16) -> RelayConfig {
    RelayConfig {
        osc_port: port,
        enabled: true,
        ..RelayConfig::default()
    }
}

fn free_port() -> u16 {
    let s = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    s.local_addr().unwrap().port()
}

async fn recv_json(rx: &mut mpsc::Receiver<Message>) -> Value {
    let msg = timeout(WAIT, rx.recv()).await.expect("timed out").expect("channel open");
    match msg {
        Message::Text(s) => serde_json::from_str(&s).unwrap(),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn udp_datagram_is_relayed_to_subscriber() {
    let app = AppState::new(enabled_on(0), loopback_opts()).unwrap();
    app.start().await;
    let bound = timeout(WAIT, app.osc_local_addr()).await.unwrap().expect("bound");

    let (tx, mut rx) = mpsc::channel(16);
    app.realtime().subscribers.register(Connection { tx });

    let sender = OscSender::connect(bound).await.unwrap();
    let n = sender.send("/hid/move", &[OscArg::Int(1), OscArg::Int(10), OscArg::Int(20)]).await.unwrap();
    assert!(n > 0);

    let v = recv_json(&mut rx).await;
    assert_eq!(v["address"], "/hid/move");
    assert_eq!(v["args"], serde_json::json!([1, 10, 20]));
    assert!(v["source"].as_str().unwrap().starts_with("127.0.0.1:"));

    app.shutdown().await;
}

#[tokio::test]
async fn hid_events_go_through_the_sender() {
    let app = AppState::new(enabled_on(0), loopback_opts()).unwrap();
    app.start().await;
    let bound = timeout(WAIT, app.osc_local_addr()).await.unwrap().expect("bound");

    let (tx, mut rx) = mpsc::channel(16);
    app.realtime().subscribers.register(Connection { tx });

    let sender = OscSender::connect(bound).await.unwrap();
    let only_buttons = HidSendFilter {
        moves: false,
        ..HidSendFilter::default()
    };

    let mv = HidEvent::Mouse {
        device_id: 3,
        x: 1,
        y: 2,
        action: MouseAction::Move { dx: 1.0, dy: 0.0 },
    };
    assert!(!sender.send_event(&mv, DEFAULT_PREFIX, &only_buttons).await.unwrap());

    let click = HidEvent::Mouse {
        device_id: 3,
        x: 100,
        y: 200,
        action: MouseAction::Down {
            button: MouseButton::Left,
            pressure: 1.0,
            clicks: 1,
        },
    };
    assert!(sender.send_event(&click, DEFAULT_PREFIX, &only_buttons).await.unwrap());

    let v = recv_json(&mut rx).await;
    assert_eq!(v["address"], "/hid/left_down");
    assert_eq!(v["args"], serde_json::json!([3, 100, 200, 1.0, 1]));

    sender.set_enabled(false);
    assert_eq!(sender.send("/hid/ignored", &[]).await.unwrap(), 0);

    app.shutdown().await;
}

#[tokio::test]
async fn bind_failure_is_retried_until_port_frees() {
    let blocker = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    let app = AppState::new(enabled_on(port), loopback_opts()).unwrap();
    app.start().await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(app.osc_bound_now().await.is_none());
    assert!(app.metrics().bind_failures.get(&[]) >= 1);

    drop(blocker);
    let bound = timeout(WAIT, app.osc_local_addr()).await.unwrap().expect("bound");
    assert_eq!(bound, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));

    app.shutdown().await;
}

#[tokio::test]
async fn toggle_stops_and_restarts_listener() {
    let app = AppState::new(enabled_on(0), loopback_opts()).unwrap();
    app.start().await;
    assert!(timeout(WAIT, app.osc_local_addr()).await.unwrap().is_some());

    assert!(!app.toggle().await.unwrap());
    assert!(app.osc_bound_now().await.is_none());
    assert!(app.osc_local_addr().await.is_none());

    assert!(app.toggle().await.unwrap());
    assert!(timeout(WAIT, app.osc_local_addr()).await.unwrap().is_some());

    app.shutdown().await;
    assert!(app.osc_bound_now().await.is_none());
}

#[tokio::test]
async fn disabled_relay_does_not_bind() {
    let app = AppState::new(RelayConfig { osc_port: 0, ..RelayConfig::default() }, loopback_opts()).unwrap();
    app.start().await;
    assert!(app.osc_local_addr().await.is_none());
}

#[tokio::test]
async fn port_change_rebinds() {
    let app = AppState::new(enabled_on(0), loopback_opts()).unwrap();
    app.start().await;
    let first = timeout(WAIT, app.osc_local_addr()).await.unwrap().expect("bound");

    let port = free_port();
    let patch: ConfigPatch = serde_json::from_value(serde_json::json!({ "oscPort": port.to_string() })).unwrap();
    let cfg = app.apply_patch(&patch).await.unwrap();
    assert_eq!(cfg.osc_port, port);

    let second = timeout(WAIT, app.osc_local_addr()).await.unwrap().expect("rebound");
    assert_eq!(second.port(), port);
    assert_ne!(first, second);

    // the old port is released
    assert!(std::net::UdpSocket::bind(first).is_ok());

    app.shutdown().await;
}
