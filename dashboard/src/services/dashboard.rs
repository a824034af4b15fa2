use common::Result;
use common::models::MovieRow;
use common::storage::MovieStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::analytics::{
    self, FilterOptions, GenreCount, HistogramBin, MovieFilter, MovieView, Recommendation,
    Statistics,
};

pub const HISTOGRAM_BINS: usize = 20;

const NO_RECOMMENDATIONS: &str = "No movies found for the selected genres.";

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationPanel {
    pub message: String,
    pub movies: Vec<Recommendation>,
}

/// Everything one dashboard render needs, computed from one query.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filter: MovieFilter,
    pub options: FilterOptions,
    pub movies: Vec<MovieView>,
    /// Present only when at least one genre is selected.
    pub recommendations: Option<RecommendationPanel>,
    pub genre_distribution: Vec<GenreCount>,
    pub rating_histogram: Vec<HistogramBin>,
    pub statistics: Statistics,
}

/// Read-only view over the stored movies. Every call re-runs the top-rated
/// query so results track the latest successful load.
pub struct DashboardService {
    store: Arc<dyn MovieStore>,
    row_limit: usize,
}

impl DashboardService {
    pub fn new(store: Arc<dyn MovieStore>, row_limit: usize) -> Self {
        Self { store, row_limit }
    }

    pub async fn fetch_data(&self) -> Result<Vec<MovieRow>> {
        let rows = self.store.top_rated(self.row_limit).await?;
        debug!(rows = rows.len(), limit = self.row_limit, "fetched dashboard rows");
        Ok(rows)
    }

    pub async fn filter_options(&self) -> Result<FilterOptions> {
        Ok(analytics::filter_options(&self.fetch_data().await?))
    }

    pub async fn movies(&self, filter: &MovieFilter) -> Result<Vec<MovieView>> {
        let rows = self.fetch_data().await?;
        Ok(analytics::apply_filter(&rows, filter)
            .iter()
            .map(MovieView::from)
            .collect())
    }

    pub async fn dashboard(&self, filter: &MovieFilter) -> Result<DashboardView> {
        let rows = self.fetch_data().await?;
        let options = analytics::filter_options(&rows);
        let filtered = analytics::apply_filter(&rows, filter);

        let recommendations = (!filter.genres.is_empty()).then(|| {
            let movies = analytics::recommend(&filtered, &filter.genres);
            let message = if movies.is_empty() {
                NO_RECOMMENDATIONS.to_string()
            } else {
                "Based on your selected genres, we recommend:".to_string()
            };
            RecommendationPanel { message, movies }
        });

        Ok(DashboardView {
            filter: filter.clone(),
            options,
            movies: filtered.iter().map(MovieView::from).collect(),
            recommendations,
            genre_distribution: analytics::genre_distribution(&filtered),
            rating_histogram: analytics::rating_histogram(&filtered, HISTOGRAM_BINS),
            statistics: analytics::describe(&filtered),
        })
    }
}
