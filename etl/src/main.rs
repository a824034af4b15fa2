use clap::{Arg, ArgAction, ArgMatches, Command};
use common::config::Settings;
use std::process;
use tracing::{debug, info};

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file")
}

fn load_settings(matches: &ArgMatches) -> Settings {
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/etl.toml");

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
    info!(config_path, "loaded configuration");
    debug!(?settings, "Parsed settings");
    settings
}

#[tokio::main]
async fn main() {
    common::env_boot::load_dotenv();

    let matches = Command::new("ETL Pipeline Manager")
        .version("1.0")
        .about("Loads the IMDb top-movies list into PostgreSQL")
        .subcommand(
            Command::new("etl")
                .about("Run the ETL pipeline: extract, create_table, transform, load")
                .arg(config_arg())
                .arg(
                    Arg::new("atomic")
                        .long("atomic")
                        .action(ArgAction::SetTrue)
                        .help("Load the whole batch in a single transaction"),
                ),
        )
        .subcommand(
            Command::new("create-table")
                .about("Create the movies table if it does not exist")
                .arg(config_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("etl", etl_matches)) => {
            let mut settings = load_settings(etl_matches);
            if etl_matches.get_flag("atomic") {
                settings.load.atomic = true;
            }

            match etl::run_etl_pipeline(&settings).await {
                Ok(report) => println!(
                    "Fetched {} movies: {} inserted, {} already present",
                    report.fetched, report.load.inserted, report.load.skipped
                ),
                Err(e) => {
                    eprintln!("ETL pipeline error: {}", e);
                    process::exit(1);
                }
            }
        }
        Some(("create-table", table_matches)) => {
            let settings = load_settings(table_matches);
            if let Err(e) = etl::create_table(&settings).await {
                eprintln!("Create table error: {}", e);
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}
