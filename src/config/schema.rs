//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::io::IsTerminal;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Lifecycle controller settings.
    pub lifecycle: LifecycleConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Demo web server settings.
    pub server: ServerConfig,

    /// Demo background worker settings.
    pub ticker: TickerConfig,
}

/// Lifecycle controller configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Budget shared by all capabilities during the drain, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Whether the lifecycle report is colored.
    pub color: ColorMode,
}

impl LifecycleConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 8,
            color: ColorMode::Never,
        }
    }
}

/// Color opt-in for the lifecycle report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Plain text.
    #[default]
    Never,
    /// Always color.
    Always,
    /// Color when stdout is a terminal.
    Auto,
}

impl ColorMode {
    /// Whether output written to stdout should be styled.
    ///
    /// Always `false` on Windows.
    pub fn styles_stdout(self) -> bool {
        if cfg!(windows) {
            return false;
        }
        match self {
            ColorMode::Never => false,
            ColorMode::Always => true,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Demo web server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Simulated work per request in seconds.
    pub request_work_secs: u64,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_work_secs: 12,
            request_timeout_secs: 30,
        }
    }
}

/// Demo background worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TickerConfig {
    /// Heartbeat interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.lifecycle.shutdown_timeout(), Duration::from_secs(8));
        assert_eq!(config.lifecycle.color, ColorMode::Never);
        assert_eq!(config.server.request_work_secs, 12);
        assert_eq!(config.ticker.interval_ms, 1000);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [lifecycle]
            color = "always"

            [server]
            bind_address = "0.0.0.0:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.lifecycle.color, ColorMode::Always);
        assert_eq!(config.lifecycle.shutdown_timeout_secs, 8);
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_never_styles() {
        assert!(!ColorMode::Never.styles_stdout());
        assert_eq!(ColorMode::Always.styles_stdout(), !cfg!(windows));
    }
}
