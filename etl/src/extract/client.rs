use async_trait::async_trait;
use common::config::ApiConfig;
use common::{Error, Result};
use std::time::Duration;
use tracing::{error, info, instrument};

use super::MovieSource;
use crate::models::RawMovieRecord;

pub const TOP_MOVIES_PATH: &str = "/imdb/top-movies";

const MAX_LOGGED_BODY: usize = 2000;

fn truncate_for_log(body: &str, max_len: usize) -> String {
    if body.len() <= max_len {
        return body.to_string();
    }
    let mut end = max_len;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

/// Client for the RapidAPI-hosted IMDb top-movies endpoint.
pub struct ImdbClient {
    http: rquest::Client,
    url: String,
    host: String,
    api_key: String,
}

impl ImdbClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.key.trim().is_empty() {
            return Err(Error::InvalidInput(
                "API key is not set (x-rapidapi-key, RAPIDAPI_KEY or APP__API__KEY)".to_string(),
            ));
        }

        let http = rquest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}{}", config.base_url.trim_end_matches('/'), TOP_MOVIES_PATH),
            host: config.host.clone(),
            api_key: config.key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues one GET for the top-movies list.
    ///
    /// Anything but a 200 is logged and returned as `ExternalService`; the
    /// body of a 200 is parsed as a JSON array of objects and returned as-is.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_top_movies(&self) -> Result<Vec<RawMovieRecord>> {
        let response = self
            .http
            .get(&self.url)
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", self.host.as_str())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status != 200 {
            error!(
                status,
                body = %truncate_for_log(&body, MAX_LOGGED_BODY),
                "Error fetching data"
            );
            return Err(Error::ExternalService { status, body });
        }

        let records: Vec<RawMovieRecord> = serde_json::from_str(&body)?;
        info!(count = records.len(), "fetched top movies");
        Ok(records)
    }
}

#[async_trait]
impl MovieSource for ImdbClient {
    async fn fetch_top_movies(&self) -> Result<Vec<RawMovieRecord>> {
        ImdbClient::fetch_top_movies(self).await
    }
}
