#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use oscrelay_gateway::config::{self, ConfigPatch, LoggingConfig, RelayConfig};

fn temp_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("oscrelay-{tag}-{}-{nanos}.json", std::process::id()))
}

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"{ "oscPort": 9000, "filters": { "enabled": true, "patternz": ["/a"] } }"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("{}").expect("must parse");
    assert_eq!(cfg, RelayConfig::default());
    assert_eq!(cfg.osc_port, 8000);
    assert_eq!(cfg.web_server_port, 3000);
    assert!(!cfg.enabled);
    assert_eq!(cfg.filters.patterns, vec!["/hid/*".to_string()]);
}

#[test]
fn full_config_file_shape() {
    let s = r#"{
      "oscPort": 9001,
      "webSocketPort": 8081,
      "webServerPort": 3001,
      "enabled": true,
      "filters": { "enabled": true, "patterns": ["/hid/**", "/midi/*"] },
      "logging": { "enabled": true, "consoleOutput": true }
    }"#;
    let cfg = config::load_from_str(s).unwrap();
    assert_eq!(cfg.osc_port, 9001);
    assert_eq!(cfg.web_socket_port, 8081);
    assert!(cfg.filters.enabled);
    assert!(cfg.logging.console_output);

    let v: serde_json::Value = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["oscPort"], 9001);
    assert_eq!(v["logging"]["consoleOutput"], true);
}

#[test]
fn pattern_without_leading_slash_is_rejected() {
    let err = config::load_from_str(r#"{ "filters": { "patterns": ["hid/*"] } }"#).unwrap_err();
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn patch_keeps_absent_fields() {
    let base = RelayConfig::default();
    let patch: ConfigPatch =
        serde_json::from_str(r#"{ "filters": { "enabled": true }, "logging": { "consoleOutput": true } }"#).unwrap();
    let next = patch.apply_to(&base);

    assert!(next.filters.enabled);
    assert_eq!(next.filters.patterns, base.filters.patterns);
    assert!(next.logging.console_output);
    assert!(!next.logging.enabled);
    assert_eq!(next.osc_port, base.osc_port);
}

#[test]
fn patch_ports_accept_numbers_and_numeric_strings() {
    let patch: ConfigPatch =
        serde_json::from_str(r#"{ "oscPort": "9100", "webServerPort": 3100, "webSocketPort": null }"#).unwrap();
    assert_eq!(patch.osc_port, Some(9100));
    assert_eq!(patch.web_server_port, Some(3100));
    assert_eq!(patch.web_socket_port, None);

    assert!(serde_json::from_str::<ConfigPatch>(r#"{ "oscPort": "abc" }"#).is_err());
    assert!(serde_json::from_str::<ConfigPatch>(r#"{ "oscPort": 70000 }"#).is_err());
    assert!(serde_json::from_str::<ConfigPatch>(r#"{ "bogus": 1 }"#).is_err());
}

#[test]
fn save_then_load_roundtrip() {
    let path = temp_path("roundtrip");
    let mut cfg = RelayConfig::default();
    cfg.enabled = true;
    cfg.filters.patterns = vec!["/a/*".into(), "/b/**".into()];

    config::save_to_file(&path, &cfg).unwrap();
    let back = config::load_from_file(&path).unwrap();
    assert_eq!(back, cfg);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_or_default_tolerates_missing_and_broken_files() {
    let missing = temp_path("missing");
    assert_eq!(config::load_or_default(&missing), RelayConfig::default());

    let broken = temp_path("broken");
    std::fs::write(&broken, "{ not json").unwrap();
    assert_eq!(config::load_or_default(&broken), RelayConfig::default());
    let _ = std::fs::remove_file(&broken);
}

#[test]
fn console_output_logs_even_when_logging_disabled() {
    let level = |enabled, console_output| {
        LoggingConfig {
            enabled,
            console_output,
        }
        .message_level()
    };
    assert_eq!(level(false, false), None);
    assert_eq!(level(true, false), Some(tracing::Level::DEBUG));
    assert_eq!(level(true, true), Some(tracing::Level::INFO));
    assert_eq!(level(false, true), Some(tracing::Level::INFO));
}
