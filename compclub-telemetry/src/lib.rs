use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_LEVEL: &str = "info,compclub_backend=debug,compclub_volunteering=debug,\
                                 compclub_database=debug,hyper=info,tower=info,tower_http=debug";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("failed to install the tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Logs to stdout. `RUST_LOG` overrides the default filter.
pub fn setup_telemetry() -> Result<(), TelemetryError> {
    let stdout_log = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(env_filter()))
        .try_init()?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into())
}
