//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, intervals > 0)
//! - Validate addresses and log levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Upper bound for the shutdown deadline: one day.
pub const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 86_400;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("{field} is not a socket address: {value}")]
    Address { field: &'static str, value: String },

    #[error("unknown log level: {0}")]
    LogLevel(String),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.lifecycle.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "lifecycle.shutdown_timeout_secs",
        });
    } else if config.lifecycle.shutdown_timeout_secs > MAX_SHUTDOWN_TIMEOUT_SECS {
        errors.push(ValidationError::TooLarge {
            field: "lifecycle.shutdown_timeout_secs",
            max: MAX_SHUTDOWN_TIMEOUT_SECS,
        });
    }
    if config.ticker.interval_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "ticker.interval_ms",
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.request_timeout_secs",
        });
    }

    check_address(&mut errors, "server.bind_address", &config.server.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.lifecycle.shutdown_timeout_secs = 0;
        config.ticker.interval_ms = 0;
        config.server.bind_address = "localhost".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::LogLevel("loud".to_string())));
        assert_eq!(
            errors[0].to_string(),
            "lifecycle.shutdown_timeout_secs must be greater than zero"
        );
    }

    #[test]
    fn test_shutdown_timeout_upper_bound() {
        let mut config = AppConfig::default();
        config.lifecycle.shutdown_timeout_secs = MAX_SHUTDOWN_TIMEOUT_SECS;
        assert!(validate_config(&config).is_ok());

        config.lifecycle.shutdown_timeout_secs = u64::MAX;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::TooLarge {
                field: "lifecycle.shutdown_timeout_secs",
                max: MAX_SHUTDOWN_TIMEOUT_SECS,
            }])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
