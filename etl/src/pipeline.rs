use chrono::{DateTime, Utc};
use common::Result;
use common::config::LoadConfig;
use common::models::MovieRow;
use common::storage::MovieStore;
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use crate::extract::MovieSource;
use crate::load::{LoadReport, ensure_schema, load, load_atomic};
use crate::transform::transform;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Commit the load step as one transaction.
    pub atomic_load: bool,
}

impl From<&LoadConfig> for PipelineOptions {
    fn from(config: &LoadConfig) -> Self {
        Self {
            atomic_load: config.atomic,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub fetched: usize,
    pub load: LoadReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs extract, create_table, transform and load once, in that order.
///
/// Each step hands its output to the next as a plain value. The first
/// failing step ends the run; nothing after it executes.
pub async fn run_pipeline(
    source: &dyn MovieSource,
    store: &dyn MovieStore,
    options: PipelineOptions,
) -> Result<RunReport> {
    let started_at = Utc::now();

    let raw_records = source
        .fetch_top_movies()
        .instrument(info_span!("extract_imdb_data"))
        .await?;

    ensure_schema(store)
        .instrument(info_span!("create_table"))
        .await?;

    let rows = info_span!("transform_data", records = raw_records.len())
        .in_scope(|| transform(&raw_records))?;

    let load_report = load_rows(store, &rows, options)
        .instrument(info_span!("load_data", rows = rows.len()))
        .await?;

    let report = RunReport {
        fetched: raw_records.len(),
        load: load_report,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        fetched = report.fetched,
        inserted = report.load.inserted,
        skipped = report.load.skipped,
        "pipeline run finished"
    );
    Ok(report)
}

async fn load_rows(
    store: &dyn MovieStore,
    rows: &[MovieRow],
    options: PipelineOptions,
) -> Result<LoadReport> {
    if options.atomic_load {
        load_atomic(store, rows).await
    } else {
        load(store, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMovieRecord;
    use async_trait::async_trait;
    use common::Error;
    use common::storage::InMemoryMovieStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource(Vec<RawMovieRecord>);

    #[async_trait]
    impl MovieSource for StaticSource {
        async fn fetch_top_movies(&self) -> Result<Vec<RawMovieRecord>> {
            Ok(self.0.clone())
        }
    }

    struct RejectingSource {
        status: u16,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MovieSource for RejectingSource {
        async fn fetch_top_movies(&self) -> Result<Vec<RawMovieRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::ExternalService {
                status: self.status,
                body: "forbidden".to_string(),
            })
        }
    }

    fn record(id: &str, rating: f64) -> RawMovieRecord {
        RawMovieRecord::try_from(json!({
            "id": id,
            "primaryTitle": format!("Movie {}", id),
            "originalTitle": format!("Movie {}", id),
            "genres": ["Drama", "Crime"],
            "startYear": 1994,
            "averageRating": rating,
            "numVotes": 1000
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn first_observed_values_win_across_runs() {
        let store = InMemoryMovieStore::new();

        let first = StaticSource(vec![record("tt1", 8.1), record("tt2", 7.0)]);
        let report = run_pipeline(&first, &store, PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.load.inserted, 2);

        let second = StaticSource(vec![record("tt1", 9.9)]);
        let report = run_pipeline(&second, &store, PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(report.load.inserted, 0);
        assert_eq!(report.load.skipped, 1);

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        let tt1 = rows.iter().find(|r| r.imdb_id == "tt1").unwrap();
        assert_eq!(tt1.average_rating, Some(8.1));
        assert_eq!(store.table_definitions(), 1);
    }

    #[tokio::test]
    async fn provider_failure_stops_before_any_storage_work() {
        let store = InMemoryMovieStore::new();
        let source = RejectingSource {
            status: 403,
            calls: AtomicUsize::new(0),
        };

        let err = run_pipeline(&source, &store, PipelineOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExternalService { status: 403, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.table_definitions(), 0);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn malformed_record_loads_nothing() {
        let store = InMemoryMovieStore::new();
        let broken = RawMovieRecord::try_from(json!({ "id": "tt3", "primaryTitle": "X" })).unwrap();
        let source = StaticSource(vec![record("tt1", 8.0), broken]);

        let err = run_pipeline(&source, &store, PipelineOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingField { index: 1, .. }));
        assert_eq!(store.table_definitions(), 1);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn atomic_option_routes_through_a_transaction() {
        let store = InMemoryMovieStore::new();
        store.create_table().await.unwrap();
        store.fail_on("tt2");
        let source = StaticSource(vec![record("tt1", 8.0), record("tt2", 7.0)]);

        let options = PipelineOptions::from(&LoadConfig { atomic: true });
        assert!(run_pipeline(&source, &store, options).await.is_err());
        assert!(store.rows().is_empty());

        assert!(run_pipeline(&source, &store, PipelineOptions::default()).await.is_err());
        assert_eq!(store.rows().len(), 1);
    }
}
