//! Logging infrastructure for the renderer control plane
//!
//! This module provides a centralized logging setup that can be configured
//! for different environments. A renderer typically runs embedded in a host
//! application or as a headless daemon, so the default is silent and the
//! host decides what reaches stderr.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output, the host application owns the output streams
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Initialize logging with the specified mode
///
/// Call this early in the application lifecycle, before building a device
/// or dispatching anything that might generate log output.
///
/// # Examples
///
/// ```rust,ignore
/// // Embedded in a host application - no output
/// renderer_control::logging::init_logging(LoggingMode::Silent)?;
///
/// // For development - compact logs to stderr
/// renderer_control::logging::init_logging(LoggingMode::Development)?;
///
/// // For debugging - verbose logs with source locations
/// renderer_control::logging::init_logging(LoggingMode::Debug)?;
/// ```
///
/// # Environment Variables
///
/// - `RENDERKIT_LOG_LEVEL`: Override log level (error, warn, info, debug, trace)
/// - `RUST_LOG`: Standard tracing filter, consulted when the above is unset
///
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => {
            // No subscriber - all logs are dropped
            Ok(())
        }
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))?;

            Ok(())
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))?;

            Ok(())
        }
    }
}

/// Initialize logging from environment variables
///
/// Reads the `RENDERKIT_LOG_MODE` environment variable to determine the
/// logging mode:
/// - "silent" -> LoggingMode::Silent
/// - "development" -> LoggingMode::Development
/// - "debug" -> LoggingMode::Debug
///
/// Defaults to Silent mode if not specified or invalid.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("RENDERKIT_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// Create an environment filter with fallback to default level
fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    // First try RENDERKIT_LOG_LEVEL, then RUST_LOG, then default
    if let Ok(level) = std::env::var("RENDERKIT_LOG_LEVEL") {
        EnvFilter::try_new(&level)
            .map_err(|_| LoggingError::InvalidEnv(format!("RENDERKIT_LOG_LEVEL={}", level)))
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::try_new(&rust_log)
            .map_err(|_| LoggingError::InvalidEnv(format!("RUST_LOG={}", rust_log)))
    } else {
        Ok(EnvFilter::new(default_level))
    }
}

/// Check if logging has been initialized
///
/// This is useful to avoid double-initialization in complex applications.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
