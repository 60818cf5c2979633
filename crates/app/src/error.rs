//! Application error types.

use domain::DomainError;
use thiserror::Error;

/// Errors raised while configuring or running the workflow.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration value could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// The metrics recorder could not be installed.
    #[error("Metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// A budget use-case failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
