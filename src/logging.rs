use crate::app_error::AppError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level` when set.
/// Output goes to stderr so command output on stdout stays clean.
pub fn init(default_level: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|err| AppError::system(format!("Invalid log filter: {err}")))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| AppError::system(format!("Failed to initialize logging: {err}")))
}
