//! Relay config loader and persistence (strict parsing).
//!
//! The config file is replaced wholesale on every accepted change: the new
//! JSON is written next to the target and renamed over it.

pub mod runtime;
pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use oscrelay_core::error::{OscRelayError, Result};

pub use runtime::{RuntimeCell, RuntimeConfig};
pub use schema::{ConfigPatch, FiltersConfig, FiltersPatch, LoggingConfig, LoggingPatch, RelayConfig};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| OscRelayError::Internal(format!("read config {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_json::from_str(s)
        .map_err(|e| OscRelayError::BadRequest(format!("invalid config json: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Startup load: a missing file means defaults; a broken one is logged and
/// replaced by defaults in memory.
pub fn load_or_default(path: impl AsRef<Path>) -> RelayConfig {
    let path = path.as_ref();
    match fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            RelayConfig::default()
        }
        _ => match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "error loading config, using defaults");
                RelayConfig::default()
            }
        },
    }
}

pub fn save_to_file(path: impl AsRef<Path>, cfg: &RelayConfig) -> Result<()> {
    let path = path.as_ref();
    let body = serde_json::to_string_pretty(cfg)
        .map_err(|e| OscRelayError::Internal(format!("config encode failed: {e}")))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, body)
        .map_err(|e| OscRelayError::Internal(format!("write config {} failed: {e}", path.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| OscRelayError::Internal(format!("replace config {} failed: {e}", path.display())))?;
    Ok(())
}
