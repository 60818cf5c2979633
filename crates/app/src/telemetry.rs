//! Tracing and metrics initialization.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::AppError;

/// Builds the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init(config: &Config) -> Result<(), AppError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = match config.log_format {
        LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };
    result.map_err(|e| AppError::Telemetry(e.to_string()))
}

/// Installs the Prometheus metrics recorder and returns its render handle.
pub fn install_metrics() -> Result<PrometheusHandle, AppError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_uses_configured_level() {
        let config = Config {
            log_level: "warn,saga=debug".to_string(),
            ..Config::default()
        };
        // RUST_LOG takes precedence when set in the test environment.
        if std::env::var("RUST_LOG").is_err() {
            assert!(env_filter(&config).to_string().contains("saga=debug"));
        }
    }
}
