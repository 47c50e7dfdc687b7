//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::amazon::regions::Region;
use crate::lookup::relay::{RelayEndpoint, RelaySet, ALTERNATE_RELAY, DEFAULT_RELAY};
use crate::lookup::target::TargetUrl;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Amazon storefront whose product pages are looked up
    #[serde(default)]
    pub region: Region,

    /// Overrides the region's product page template (e.g. `https://www.amazon.com/dp/`)
    #[serde(default)]
    pub target_url: Option<String>,

    /// Relay used for the first lookup
    #[serde(default = "default_relay")]
    pub relay: String,

    /// Known-good relays offered when a relay reports a server error
    #[serde(default = "default_relays")]
    pub relays: Vec<String>,

    /// Accept relays outside `relays` when switching
    #[serde(default)]
    pub allow_custom_relay: bool,

    /// Outbound proxy in front of the relay (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds; a timed-out lookup resolves as "not found"
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_relay() -> String {
    DEFAULT_RELAY.to_string()
}

fn default_relays() -> Vec<String> {
    vec![DEFAULT_RELAY.to_string(), ALTERNATE_RELAY.to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: Region::Us,
            target_url: None,
            relay: default_relay(),
            relays: default_relays(),
            allow_custom_relay: false,
            proxy: None,
            timeout_secs: default_timeout_secs(),
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("asin-lookup").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparsable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(region) = std::env::var("AMZ_REGION") {
            if let Ok(r) = region.parse() {
                self.region = r;
            }
        }

        if let Ok(relay) = std::env::var("AMZ_RELAY") {
            self.relay = relay;
        }

        if let Ok(target) = std::env::var("AMZ_TARGET_URL") {
            self.target_url = Some(target);
        }

        if let Ok(proxy) = std::env::var("AMZ_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("AMZ_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }

    /// Product page template: the explicit override, else the region's.
    pub fn target(&self) -> TargetUrl {
        match &self.target_url {
            Some(url) => TargetUrl::new(url.clone()),
            None => TargetUrl::for_region(self.region),
        }
    }

    pub fn relay_endpoint(&self) -> RelayEndpoint {
        RelayEndpoint::new(self.relay.clone())
    }

    /// The known relay set. An empty list falls back to the built-in pair.
    pub fn relay_set(&self) -> RelaySet {
        let set = if self.relays.is_empty() {
            RelaySet::default()
        } else {
            RelaySet::new(self.relays.iter().cloned().map(RelayEndpoint::new).collect())
        };
        set.permissive(self.allow_custom_relay)
    }
}

/// Output format for rendered lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
