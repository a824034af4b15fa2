use common::Result;
use common::models::MovieRow;
use common::storage::MovieStore;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub attempted: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Inserts each row on its own, skipping rows whose `imdb_id` is already
/// stored.
///
/// Rows are not wrapped in a transaction: when an insert fails the rows
/// before it stay committed and the rows after it are never attempted.
pub async fn load(store: &dyn MovieStore, rows: &[MovieRow]) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    for (index, row) in rows.iter().enumerate() {
        report.attempted += 1;
        match store.insert_if_absent(row).await {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                error!(
                    index,
                    imdb_id = %row.imdb_id,
                    committed = report.inserted,
                    error = %e,
                    "load aborted"
                );
                return Err(e);
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Data loaded into movies table."
    );
    Ok(report)
}

/// Same insert-if-absent semantics as [`load`], but all-or-nothing.
pub async fn load_atomic(store: &dyn MovieStore, rows: &[MovieRow]) -> Result<LoadReport> {
    let inserted = store.insert_all_if_absent(rows).await?;
    let report = LoadReport {
        attempted: rows.len(),
        inserted,
        skipped: rows.len() - inserted,
    };

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Data loaded into movies table in one transaction."
    );
    Ok(report)
}
