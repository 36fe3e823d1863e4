//! Configuration module for the moros engine

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default upper port bound (scan ports 1..=N)
pub const DEFAULT_PORT_LIMIT: u16 = 1024;

/// Default worker-pool size for port scanning
pub const DEFAULT_WORKERS: usize = 100;

/// Main configuration structure for a scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Target address or CIDR range to scan
    pub target: String,

    /// List of ports to scan
    pub ports: Vec<u16>,

    /// Worker-pool size; bounds concurrent sockets per host
    pub workers: usize,

    /// Timeout for each connection attempt in milliseconds
    pub connect_timeout: u64,

    /// Timeout for the host discovery round in milliseconds
    pub discovery_timeout: u64,

    /// Timeout for each banner read in milliseconds
    pub banner_timeout: u64,

    /// Maximum advisories returned per fingerprint lookup
    pub vuln_limit: usize,

    /// Whether to query the vulnerability database at all
    pub lookup_vulns: bool,

    /// Optional NVD API key; lookups without one are heavily rate-limited
    pub nvd_api_key: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            ports: (1..=DEFAULT_PORT_LIMIT).collect(),
            workers: DEFAULT_WORKERS,
            connect_timeout: 500,
            discovery_timeout: 2000,
            banner_timeout: 2000,
            vuln_limit: 5,
            lookup_vulns: true,
            nvd_api_key: None,
        }
    }
}

impl ScanConfig {
    /// Create a new scan configuration for the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Set the ports to scan explicitly
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Scan ports 1..=limit
    pub fn with_port_limit(mut self, limit: u16) -> Self {
        self.ports = (1..=limit).collect();
        self
    }

    /// Set the worker-pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-connection timeout in milliseconds
    pub fn with_connect_timeout(mut self, millis: u64) -> Self {
        self.connect_timeout = millis;
        self
    }

    /// Set the banner read timeout in milliseconds
    pub fn with_banner_timeout(mut self, millis: u64) -> Self {
        self.banner_timeout = millis;
        self
    }

    /// Set the discovery round timeout in milliseconds
    pub fn with_discovery_timeout(mut self, millis: u64) -> Self {
        self.discovery_timeout = millis;
        self
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }

    pub fn discovery_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout)
    }

    pub fn banner_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.banner_timeout)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            crate::ScanError::Config(format!("failed to read config file: {}", e))
        })?;

        let config: ScanConfig = toml::from_str(&content)
            .map_err(|e| crate::ScanError::Config(format!("failed to parse TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from `~/.moros.toml`, falling back to defaults
    pub fn load_default_config() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let config_path = home_dir.join(".moros.toml");

        if config_path.exists() {
            if let Ok(config) = Self::from_toml_file(&config_path) {
                log::info!("loaded config from {}", config_path.display());
                return config;
            }
        }

        Self::default()
    }

    /// Validate the configuration; fails before any scanning begins
    pub fn validate(&self) -> crate::Result<()> {
        if self.target.is_empty() {
            return Err(crate::ScanError::InvalidTarget(
                "target cannot be empty".to_string(),
            ));
        }

        if self.ports.is_empty() {
            return Err(crate::ScanError::PortRange(
                "no ports specified".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(crate::ScanError::Config(
                "worker count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
