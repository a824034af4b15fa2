pub mod stats;

use common::models::MovieRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub use stats::{ColumnSummary, HistogramBin, Statistics, describe, rating_histogram};

/// User-chosen filters. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFilter {
    pub year: Option<i32>,
    /// Genre labels as produced by [`MovieRow::genre_label`].
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Distinct years, most recent first.
    pub years: Vec<i32>,
    /// Distinct genre labels in first-seen order.
    pub genres: Vec<String>,
}

/// Table row as the dashboard shows it, with genres flattened to a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    pub imdb_id: String,
    pub primary_title: Option<String>,
    pub genre: String,
    pub start_year: Option<i32>,
    pub average_rating: Option<f64>,
    pub num_votes: Option<i64>,
}

impl From<&MovieRow> for MovieView {
    fn from(row: &MovieRow) -> Self {
        Self {
            imdb_id: row.imdb_id.clone(),
            primary_title: row.primary_title.clone(),
            genre: row.genre_label(),
            start_year: row.start_year,
            average_rating: row.average_rating,
            num_votes: row.num_votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub primary_title: Option<String>,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

pub fn filter_options(rows: &[MovieRow]) -> FilterOptions {
    let years: BTreeSet<i32> = rows.iter().filter_map(|row| row.start_year).collect();

    let mut genres: Vec<String> = Vec::new();
    for label in rows.iter().map(MovieRow::genre_label) {
        if !genres.contains(&label) {
            genres.push(label);
        }
    }

    FilterOptions {
        years: years.into_iter().rev().collect(),
        genres,
    }
}

/// Keeps rows from the selected year whose genre label is one of the
/// selected labels.
pub fn apply_filter(rows: &[MovieRow], filter: &MovieFilter) -> Vec<MovieRow> {
    rows.iter()
        .filter(|row| filter.year.is_none_or(|year| row.start_year == Some(year)))
        .filter(|row| filter.genres.is_empty() || filter.genres.contains(&row.genre_label()))
        .cloned()
        .collect()
}

/// Titles whose genre label contains any of `genres`. Empty when no genre
/// is selected.
pub fn recommend(rows: &[MovieRow], genres: &[String]) -> Vec<Recommendation> {
    if genres.is_empty() {
        return Vec::new();
    }

    rows.iter()
        .filter(|row| {
            let label = row.genre_label();
            genres.iter().any(|genre| label.contains(genre.as_str()))
        })
        .map(|row| Recommendation {
            primary_title: row.primary_title.clone(),
            average_rating: row.average_rating,
        })
        .collect()
}

/// Row count per genre label, most frequent first. Ties keep first-seen order.
pub fn genre_distribution(rows: &[MovieRow]) -> Vec<GenreCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for label in rows.iter().map(MovieRow::genre_label) {
        let count = counts.entry(label.clone()).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }

    let mut distribution: Vec<GenreCount> = order
        .into_iter()
        .map(|genre| {
            let count = counts[&genre];
            GenreCount { genre, count }
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution
}

#[cfg(test)]
pub(crate) mod test_rows {
    use common::models::MovieRow;

    pub fn movie(id: &str, title: &str, genres: &[&str], year: i32, rating: f64, votes: i64) -> MovieRow {
        MovieRow {
            imdb_id: id.to_string(),
            primary_title: Some(title.to_string()),
            original_title: Some(title.to_string()),
            genre: Some(genres.iter().map(|g| g.to_string()).collect()),
            start_year: Some(year),
            average_rating: Some(rating),
            num_votes: Some(votes),
        }
    }

    pub fn catalogue() -> Vec<MovieRow> {
        vec![
            movie("tt0111161", "The Shawshank Redemption", &["Drama"], 1994, 9.3, 2_900_000),
            movie("tt0068646", "The Godfather", &["Crime", "Drama"], 1972, 9.2, 2_000_000),
            movie("tt0110912", "Pulp Fiction", &["Crime", "Drama"], 1994, 8.9, 2_200_000),
            movie("tt0109830", "Forrest Gump", &["Drama", "Romance"], 1994, 8.8, 2_300_000),
            movie("tt0071562", "The Godfather Part II", &["Crime", "Drama"], 1974, 9.0, 1_400_000),
        ]
    }
}
