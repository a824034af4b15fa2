use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::MovieStore;
use crate::models::MovieRow;
use crate::{Error, Result};

/// Process-local store with the same observable semantics as the
/// PostgreSQL one: a table must exist before writes, and `imdb_id` is unique.
#[derive(Default)]
pub struct InMemoryMovieStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    table: Option<Vec<MovieRow>>,
    table_definitions: usize,
    failing_ids: HashSet<String>,
}

impl MemoryState {
    fn table_mut(&mut self) -> Result<&mut Vec<MovieRow>> {
        self.table
            .as_mut()
            .ok_or_else(|| Error::Storage("relation \"movies\" does not exist".to_string()))
    }

    fn check_failure(&self, row: &MovieRow) -> Result<()> {
        if self.failing_ids.contains(&row.imdb_id) {
            return Err(Error::Storage(format!(
                "connection lost while inserting {}",
                row.imdb_id
            )));
        }
        Ok(())
    }
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose table already holds `rows`.
    pub fn with_rows(rows: Vec<MovieRow>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.table = Some(rows);
            state.table_definitions = 1;
        }
        store
    }

    /// Makes every later insert of `imdb_id` fail with a storage error.
    pub fn fail_on(&self, imdb_id: &str) {
        self.lock().failing_ids.insert(imdb_id.to_string());
    }

    pub fn rows(&self) -> Vec<MovieRow> {
        self.lock().table.clone().unwrap_or_default()
    }

    pub fn table_definitions(&self) -> usize {
        self.lock().table_definitions
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-write.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn insert_into(table: &mut Vec<MovieRow>, row: &MovieRow) -> bool {
    if table.iter().any(|existing| existing.imdb_id == row.imdb_id) {
        return false;
    }
    table.push(row.clone());
    true
}

fn by_rating_desc(a: &MovieRow, b: &MovieRow) -> Ordering {
    match (a.average_rating, b.average_rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn create_table(&self) -> Result<()> {
        let mut state = self.lock();
        if state.table.is_none() {
            state.table = Some(Vec::new());
            state.table_definitions += 1;
        }
        Ok(())
    }

    async fn insert_if_absent(&self, row: &MovieRow) -> Result<bool> {
        let mut state = self.lock();
        state.check_failure(row)?;
        Ok(insert_into(state.table_mut()?, row))
    }

    async fn insert_all_if_absent(&self, rows: &[MovieRow]) -> Result<usize> {
        let mut state = self.lock();
        let mut staged = state.table_mut()?.clone();
        let mut inserted = 0;
        for row in rows {
            state.check_failure(row)?;
            if insert_into(&mut staged, row) {
                inserted += 1;
            }
        }
        state.table = Some(staged);
        Ok(inserted)
    }

    async fn top_rated(&self, limit: usize) -> Result<Vec<MovieRow>> {
        let mut state = self.lock();
        let mut rows = state.table_mut()?.clone();
        rows.sort_by(by_rating_desc);
        rows.truncate(limit);
        Ok(rows)
    }
}
