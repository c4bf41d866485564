// ABOUTME: Logging configuration and structured logging setup for observability and debugging
// ABOUTME: Configures log level and output format for hosts embedding the planner
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Structured logging setup
//!
//! The planner itself only emits `tracing` events; hosts that want output on
//! stderr can call [`LoggingConfig::init`] once at startup. `RUST_LOG`
//! overrides the configured level when set.

use std::env;
use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps sqlx's per-query logging below the host's chosen level. Scoped to the
/// `sqlx` target so it never widens or narrows anything else.
const SQLX_NOISE_DIRECTIVE: &str = "sqlx=warn";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Default human-readable format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
    /// `JSON` format for production logging
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    ///
    /// `RUST_LOG` sets the level directive; `LOG_FORMAT` one of
    /// `json`/`compact`/`pretty`.
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
        Self { level, format }
    }

    /// Initialize the global tracing subscriber
    ///
    /// Idempotent: if a subscriber is already installed (e.g. by a test
    /// harness), the existing one is kept.
    pub fn init(&self) {
        let mut env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        if let Ok(directive) = SQLX_NOISE_DIRECTIVE.parse() {
            env_filter = env_filter.add_directive(directive);
        }

        let registry = tracing_subscriber::registry().with(env_filter);

        let result = match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_target(true)
                    .with_writer(io::stderr)
                    .json();
                registry.with(json_layer).try_init()
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer().with_target(true).with_writer(io::stderr);
                registry.with(pretty_layer).try_init()
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr);
                registry.with(compact_layer).try_init()
            }
        };

        if result.is_err() {
            tracing::debug!("tracing subscriber already installed; keeping the existing one");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_pretty_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn sqlx_noise_directive_is_valid() {
        let directive = SQLX_NOISE_DIRECTIVE.parse::<tracing_subscriber::filter::Directive>();
        assert!(directive.is_ok(), "{directive:?}");
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        config.init();
        config.init();
    }
}
