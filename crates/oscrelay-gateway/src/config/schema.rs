use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

use oscrelay_core::error::{OscRelayError, Result};
use oscrelay_core::filter::AddressFilter;

/// Relay configuration, persisted as camelCase JSON.
///
/// Port `0` asks the OS for an ephemeral port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default = "default_osc_port")]
    pub osc_port: u16,

    /// Kept for config-file compatibility; WebSocket subscribers share the
    /// web server port.
    #[serde(default = "default_web_socket_port")]
    pub web_socket_port: u16,

    #[serde(default = "default_web_server_port")]
    pub web_server_port: u16,

    /// Whether the OSC listener runs.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub filters: FiltersConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            osc_port: default_osc_port(),
            web_socket_port: default_web_socket_port(),
            web_server_port: default_web_server_port(),
            enabled: false,
            filters: FiltersConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        self.filters.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            patterns: default_patterns(),
        }
    }
}

impl FiltersConfig {
    pub fn validate(&self) -> Result<()> {
        for p in &self.patterns {
            if !p.starts_with('/') {
                return Err(OscRelayError::BadRequest(format!(
                    "filters.patterns entry must start with '/': {p:?}"
                )));
            }
        }
        self.compile().map(|_| ())
    }

    pub fn compile(&self) -> Result<AddressFilter> {
        AddressFilter::compile(self.enabled, &self.patterns)
    }
}

/// Per-message logging switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log messages at debug.
    #[serde(default)]
    pub enabled: bool,

    /// Log messages at info. Takes effect on its own, without `enabled`.
    #[serde(default)]
    pub console_output: bool,
}

impl LoggingConfig {
    /// Level for per-message OSC logging; `None` disables it.
    pub fn message_level(&self) -> Option<tracing::Level> {
        if self.console_output {
            Some(tracing::Level::INFO)
        } else if self.enabled {
            Some(tracing::Level::DEBUG)
        } else {
            None
        }
    }
}

fn default_osc_port() -> u16 {
    8000
}
fn default_web_socket_port() -> u16 {
    8080
}
fn default_web_server_port() -> u16 {
    3000
}
fn default_patterns() -> Vec<String> {
    vec!["/hid/*".into()]
}

/// Partial update posted to `/api/config`. Absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPatch {
    #[serde(default, deserialize_with = "de_opt_port")]
    pub osc_port: Option<u16>,
    #[serde(default, deserialize_with = "de_opt_port")]
    pub web_socket_port: Option<u16>,
    #[serde(default, deserialize_with = "de_opt_port")]
    pub web_server_port: Option<u16>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub filters: Option<FiltersPatch>,
    #[serde(default)]
    pub logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FiltersPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggingPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub console_output: Option<bool>,
}

impl ConfigPatch {
    /// Produce the replacement config. `base` is left untouched.
    pub fn apply_to(&self, base: &RelayConfig) -> RelayConfig {
        let mut next = base.clone();
        if let Some(p) = self.osc_port {
            next.osc_port = p;
        }
        if let Some(p) = self.web_socket_port {
            next.web_socket_port = p;
        }
        if let Some(p) = self.web_server_port {
            next.web_server_port = p;
        }
        if let Some(e) = self.enabled {
            next.enabled = e;
        }
        if let Some(f) = &self.filters {
            if let Some(e) = f.enabled {
                next.filters.enabled = e;
            }
            if let Some(p) = &f.patterns {
                next.filters.patterns = p.clone();
            }
        }
        if let Some(l) = &self.logging {
            if let Some(e) = l.enabled {
                next.logging.enabled = e;
            }
            if let Some(c) = l.console_output {
                next.logging.console_output = c;
            }
        }
        next
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Num(u64),
    Text(String),
}

/// Ports arrive from HTML forms as either numbers or numeric strings.
fn de_opt_port<'de, D>(d: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<PortRepr>::deserialize(d)? else {
        return Ok(None);
    };
    let n = match raw {
        PortRepr::Num(n) => n,
        PortRepr::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid port: {s:?}")))?,
    };
    u16::try_from(n)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("port out of range: {n}")))
}
