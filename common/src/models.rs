use serde::{Deserialize, Serialize};

/// Canonical, storage-ready movie entry. `imdb_id` is the unique key; every
/// other column passes through whatever the provider sent, nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRow {
    pub imdb_id: String,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub genre: Option<Vec<String>>,
    pub start_year: Option<i32>,
    pub average_rating: Option<f64>,
    pub num_votes: Option<i64>,
}

impl MovieRow {
    /// Genres joined the way the dashboard filters and groups them.
    pub fn genre_label(&self) -> String {
        self.genre
            .as_deref()
            .map(|genres| genres.join(", "))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(genre: Option<Vec<&str>>) -> MovieRow {
        MovieRow {
            imdb_id: "tt0111161".to_string(),
            primary_title: Some("The Shawshank Redemption".to_string()),
            original_title: Some("The Shawshank Redemption".to_string()),
            genre: genre.map(|g| g.into_iter().map(String::from).collect()),
            start_year: Some(1994),
            average_rating: Some(9.3),
            num_votes: Some(3_000_000),
        }
    }

    #[test]
    fn genre_label_joins_in_order() {
        assert_eq!(row(Some(vec!["Drama", "Crime"])).genre_label(), "Drama, Crime");
        assert_eq!(row(Some(vec![])).genre_label(), "");
        assert_eq!(row(None).genre_label(), "");
    }
}
