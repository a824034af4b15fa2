use common::config::Settings;
use etl::run_etl_pipeline;
use std::process;
use tracing::debug;

/// Entry point for the daily scheduler: one full run, exit status 1 on failure.
#[tokio::main]
async fn main() {
    common::env_boot::load_dotenv();

    // Get config path from command line args or use default
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/etl.toml".to_string());

    let settings = match Settings::new(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = common::telemetry::init_tracing(&settings.logging) {
        eprintln!("{}", e);
    }
    debug!(?settings, "Parsed settings");

    if let Err(e) = run_etl_pipeline(&settings).await {
        eprintln!("ETL pipeline error: {}", e);
        process::exit(1);
    }
}
