pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::Result;
use crate::models::MovieRow;

pub use memory::InMemoryMovieStore;
pub use postgres::PgMovieStore;

/// Destination for canonical movie rows.
///
/// Every write is insert-if-absent keyed on `imdb_id`: an existing row is
/// never modified. Uniqueness is the backend's job, not the caller's.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Creates the `movies` table unless it already exists.
    async fn create_table(&self) -> Result<()>;

    /// Inserts `row` unless a row with the same `imdb_id` exists.
    /// Returns `true` when a row was written.
    async fn insert_if_absent(&self, row: &MovieRow) -> Result<bool>;

    /// Inserts every row with insert-if-absent semantics inside a single
    /// transaction. Either all new rows are committed or none are.
    async fn insert_all_if_absent(&self, rows: &[MovieRow]) -> Result<usize>;

    /// Highest-rated rows first, unrated rows last, at most `limit` of them.
    async fn top_rated(&self, limit: usize) -> Result<Vec<MovieRow>>;
}
