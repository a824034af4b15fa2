use clap::{Command, Arg};
use common::config::Settings;
use std::process;
use tracing::debug;


#[tokio::main]
async fn main() {
    common::env_boot::load_dotenv();

    let matches = Command::new("Movie Dashboard")
        .version("1.0")
        .about("Serves filters and analytics over the stored top movies")
        .subcommand(
            Command::new("dashboard")
                .about("Run the dashboard API server")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("dashboard", dashboard_matches)) => {
            let config_path = dashboard_matches.get_one::<String>("config")
                .map(|s| s.as_str())
                .unwrap_or("config/dashboard.toml");

            let settings = match Settings::new(config_path) {
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

            if let Err(e) = dashboard::run_dashboard(&settings).await {
                eprintln!("Dashboard error: {}", e);
                process::exit(1);
            }
        }
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
            process::exit(1);
        }
    }
}
