//! Structured logging setup for Keysmith tools and services
//!
//! Both variants log to stderr so command output on stdout stays
//! machine-readable.

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn json_subscriber<W>(default_level: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(env_filter(default_level)).with(
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_current_span(false)
            .with_span_list(false),
    )
}

fn console_subscriber<W>(default_level: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(env_filter(default_level)).with(
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    )
}

/// Initialize structured logging
///
/// This sets up:
/// - JSON formatted logs on stderr (for production)
/// - Environment-based log level filtering (`RUST_LOG` wins over `default_level`)
/// - Service name tagging
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(service_name: &str, default_level: &str) -> Result<(), TryInitError> {
    json_subscriber(default_level, std::io::stderr).try_init()?;

    tracing::info!(service = service_name, "Logging initialized");
    Ok(())
}

/// Initialize simple console logging on stderr (for development and CLI use)
pub fn init_console_logging(service_name: &str, default_level: &str) -> Result<(), TryInitError> {
    console_subscriber(default_level, std::io::stderr).try_init()?;

    tracing::info!(service = service_name, "Console logging initialized");
    Ok(())
}
