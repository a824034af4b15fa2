pub mod client;

use async_trait::async_trait;
use common::Result;

use crate::models::RawMovieRecord;

pub use client::ImdbClient;

/// Where a pipeline run gets its raw records from.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn fetch_top_movies(&self) -> Result<Vec<RawMovieRecord>>;
}
