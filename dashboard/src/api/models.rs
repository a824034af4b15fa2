use serde::{Deserialize, Serialize};

use crate::analytics::MovieFilter;

// Request models
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    /// Selected genre labels separated by `|`; labels themselves contain commas.
    pub genres: Option<String>,
}

impl DashboardQuery {
    pub fn into_filter(self) -> MovieFilter {
        let genres = self
            .genres
            .as_deref()
            .unwrap_or_default()
            .split('|')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
            .map(str::to_string)
            .collect();

        MovieFilter {
            year: self.year,
            genres,
        }
    }
}

// Response models
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
