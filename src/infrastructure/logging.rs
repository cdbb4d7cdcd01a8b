use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use crate::config::{LogFormat, LoggingConfig};

const FALLBACK_DIRECTIVE: &str = "info";

/// Where the active filter directives came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterSource {
    Env,
    Config,
    Fallback,
}

/// Pick filter directives: `RUST_LOG` first, then the configured level
///
/// Directives that fail to parse are skipped rather than aborting startup.
fn build_filter(env_directives: Option<&str>, configured: &str) -> (EnvFilter, FilterSource) {
    if let Some(filter) = env_directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return (filter, FilterSource::Env);
    }

    match EnvFilter::try_new(configured) {
        Ok(filter) => (filter, FilterSource::Config),
        Err(_) => (EnvFilter::new(FALLBACK_DIRECTIVE), FilterSource::Fallback),
    }
}

fn format_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, source) = build_filter(env_directives.as_deref(), &config.level);

    tracing_subscriber::registry()
        .with(format_layer(config.format))
        .with(filter)
        .try_init()?;

    match source {
        FilterSource::Env => tracing::info!("Logging initialized from {}", EnvFilter::DEFAULT_ENV),
        FilterSource::Config => tracing::info!(level = %config.level, "Logging initialized"),
        FilterSource::Fallback => tracing::warn!(
            level = %config.level,
            fallback = FALLBACK_DIRECTIVE,
            "Configured log level is invalid; using fallback"
        ),
    }

    Ok(())
}
