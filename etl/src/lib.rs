pub mod extract;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod transform;

use common::Result;
use common::config::Settings;
use common::storage::PgMovieStore;
use tracing::info;

use extract::ImdbClient;
use pipeline::{PipelineOptions, RunReport, run_pipeline};

/// Runs the complete ETL pipeline against the configured provider and
/// database. The pool is closed whether or not the run succeeds.
pub async fn run_etl_pipeline(settings: &Settings) -> Result<RunReport> {
    let client = ImdbClient::new(&settings.api)?;
    let store = PgMovieStore::connect(&settings.database).await?;

    info!(url = client.url(), "starting ETL run");
    let outcome = run_pipeline(&client, &store, PipelineOptions::from(&settings.load)).await;

    store.close().await;
    outcome
}

/// Runs only the create_table step.
pub async fn create_table(settings: &Settings) -> Result<()> {
    let store = PgMovieStore::connect(&settings.database).await?;
    let outcome = load::ensure_schema(&store).await;
    store.close().await;
    outcome
}
