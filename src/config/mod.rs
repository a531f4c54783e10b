//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Retrieval Gateway connection; without it the dashboard serves an
    /// empty snapshot and detail lookups return 503
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Retrieval Gateway connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub url: String,
    /// Bearer API key; the gateway issues keys prefixed `al_sk_`
    pub api_key: String,
    /// Timeout in seconds (supports both timeout_secs and timeout field names)
    #[serde(default = "default_timeout", alias = "timeout")]
    pub timeout_secs: u64,
}

/// Snapshot sync configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_enabled")]
    pub enabled: bool,
    /// Seconds between gateway polls
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Page size requested per poll; the gateway caps pages at 100
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr) - default for development
    #[default]
    Console,
    /// Log to file with optional rotation - recommended for production
    File,
    /// Log to both console and file
    Both,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_timeout() -> u64 {
    30
}

fn default_snapshot_enabled() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_page_limit() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/auditlayer/webui")
}

fn default_log_prefix() -> String {
    "auditlayer-webui".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: default_snapshot_enabled(),
            refresh_interval_secs: default_refresh_interval(),
            page_limit: default_page_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gateway: None,
            snapshot: SnapshotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with AUDITLAYER_)
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Check for config path override from environment
        let config_path = std::env::var("AUDITLAYER_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            if path.exists() {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_norway::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            } else {
                eprintln!(
                    "[CONFIG] Config file path exists but file not found: {:?}",
                    path
                );
                AppConfig::default()
            }
        } else {
            eprintln!("[CONFIG] No config file found, using defaults");
            AppConfig::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Current directory
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            // System config directory
            PathBuf::from("/etc/auditlayer-webui/config.yaml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("auditlayer-webui/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(host) = std::env::var("AUDITLAYER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AUDITLAYER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Gateway overrides
        if let Ok(url) = std::env::var("AUDITLAYER_GATEWAY_URL") {
            let gateway = self.gateway.get_or_insert_with(|| GatewayConfig {
                url: url.clone(),
                api_key: String::new(),
                timeout_secs: default_timeout(),
            });
            gateway.url = url;
        }
        if let Ok(api_key) = std::env::var("AUDITLAYER_GATEWAY_API_KEY") {
            if let Some(ref mut gateway) = self.gateway {
                gateway.api_key = api_key;
            }
        }

        // Snapshot overrides
        if let Ok(interval) = std::env::var("AUDITLAYER_SNAPSHOT_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.snapshot.refresh_interval_secs = secs;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AUDITLAYER_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("AUDITLAYER_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("AUDITLAYER_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        // Validate port
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        // Validate gateway settings if present
        if let Some(ref gateway) = self.gateway {
            if gateway.url.is_empty() {
                anyhow::bail!("Gateway URL cannot be empty");
            }
            if gateway.timeout_secs == 0 {
                anyhow::bail!("Gateway timeout cannot be 0");
            }
            if !gateway.api_key.starts_with("al_sk_") {
                tracing::warn!(
                    "Gateway API key does not look like an issued key (expected 'al_sk_' prefix)"
                );
            }
        }

        // Validate snapshot settings
        if self.snapshot.refresh_interval_secs == 0 {
            anyhow::bail!("Snapshot refresh interval cannot be 0");
        }
        if self.snapshot.page_limit == 0 {
            anyhow::bail!("Snapshot page limit cannot be 0");
        }
        if self.snapshot.page_limit > 100 {
            tracing::warn!(
                "Snapshot page limit {} exceeds the gateway maximum of 100; pages will be capped",
                self.snapshot.page_limit
            );
        }

        Ok(())
    }

    /// Create a default configuration file
    pub fn create_default_config(path: &PathBuf) -> Result<()> {
        let config = AppConfig::default();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_norway::to_string(&config)?;
        std::fs::write(path, yaml)?;

        Ok(())
    }
}
