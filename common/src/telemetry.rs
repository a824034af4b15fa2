use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.filter` when set. Call once per binary.
pub fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match logging.format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.with_line_number(true).with_file(true).try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
