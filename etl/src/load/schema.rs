use common::Result;
use common::storage::MovieStore;
use tracing::info;

/// Creates the `movies` table if it is not there yet. Safe to run every time.
pub async fn ensure_schema(store: &dyn MovieStore) -> Result<()> {
    store.create_table().await?;
    info!("Table created or already exists.");
    Ok(())
}
