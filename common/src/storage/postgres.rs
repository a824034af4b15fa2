use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::MovieStore;
use crate::Result;
use crate::config::DatabaseConfig;
use crate::models::MovieRow;

pub const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id SERIAL PRIMARY KEY,
    imdb_id TEXT UNIQUE NOT NULL,
    primary_title TEXT,
    original_title TEXT,
    genre TEXT[],
    start_year INTEGER,
    average_rating DOUBLE PRECISION,
    num_votes BIGINT
);
"#;

pub const INSERT_MOVIE_SQL: &str = r#"
INSERT INTO movies (imdb_id, primary_title, original_title, genre, start_year, average_rating, num_votes)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (imdb_id) DO NOTHING;
"#;

// Tables created by the older DDL keep `num_votes INTEGER` and a nullable
// `imdb_id`; the cast and the filter let both layouts decode.
pub const SELECT_TOP_RATED_SQL: &str = r#"
SELECT imdb_id, primary_title, original_title, genre, start_year, average_rating,
       num_votes::BIGINT AS num_votes
FROM movies
WHERE imdb_id IS NOT NULL
ORDER BY average_rating DESC NULLS LAST
LIMIT $1;
"#;

/// PostgreSQL-backed store over a small connection pool.
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    // Credentials never go into the span.
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!("connected to db");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Closes the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("db pool closed");
    }
}

fn insert_query(row: &MovieRow) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(INSERT_MOVIE_SQL)
        .bind(&row.imdb_id)
        .bind(&row.primary_title)
        .bind(&row.original_title)
        .bind(&row.genre)
        .bind(row.start_year)
        .bind(row.average_rating)
        .bind(row.num_votes)
}

fn row_to_movie(row: &PgRow) -> std::result::Result<MovieRow, sqlx::Error> {
    Ok(MovieRow {
        imdb_id: row.try_get("imdb_id")?,
        primary_title: row.try_get("primary_title")?,
        original_title: row.try_get("original_title")?,
        genre: row.try_get("genre")?,
        start_year: row.try_get("start_year")?,
        average_rating: row.try_get("average_rating")?,
        num_votes: row.try_get("num_votes")?,
    })
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn create_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_if_absent(&self, row: &MovieRow) -> Result<bool> {
        let result = insert_query(row).execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_all_if_absent(&self, rows: &[MovieRow]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for row in rows {
            let result = insert_query(row).execute(&mut *tx).await?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn top_rated(&self, limit: usize) -> Result<Vec<MovieRow>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(SELECT_TOP_RATED_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let movies = rows
            .iter()
            .map(row_to_movie)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Executor;

    const LEGACY_CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE movies (
        id SERIAL PRIMARY KEY,
        imdb_id TEXT UNIQUE,
        primary_title TEXT,
        original_title TEXT,
        genre TEXT[],
        start_year INTEGER,
        average_rating FLOAT,
        num_votes INTEGER
    );
    "#;

    /// A store confined to a fresh schema of the database at `DATABASE_URL`.
    /// The schema is dropped by `TestDb::drop_schema`.
    struct TestDb {
        admin: PgPool,
        schema: String,
        store: PgMovieStore,
    }

    impl TestDb {
        async fn start(name: &str) -> Option<Self> {
            let Ok(url) = std::env::var("DATABASE_URL") else {
                eprintln!("DATABASE_URL not set, skipping {}", name);
                return None;
            };

            let schema = format!("movies_{}_{}", name, std::process::id());
            let admin = PgPoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .unwrap();
            admin
                .execute(format!("DROP SCHEMA IF EXISTS {} CASCADE", schema).as_str())
                .await
                .unwrap();
            admin
                .execute(format!("CREATE SCHEMA {}", schema).as_str())
                .await
                .unwrap();

            let search_path = format!("SET search_path TO {}", schema);
            let pool = PgPoolOptions::new()
                .max_connections(2)
                .after_connect(move |conn, _meta| {
                    let search_path = search_path.clone();
                    Box::pin(async move {
                        conn.execute(search_path.as_str()).await?;
                        Ok(())
                    })
                })
                .connect(&url)
                .await
                .unwrap();

            Some(Self {
                admin,
                schema,
                store: PgMovieStore::from_pool(pool),
            })
        }

        async fn execute(&self, sql: &str) {
            self.store.pool.execute(sql).await.unwrap();
        }

        async fn count(&self) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM movies")
                .fetch_one(&self.store.pool)
                .await
                .unwrap()
        }

        async fn drop_schema(self) {
            self.store.close().await;
            self.admin
                .execute(format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema).as_str())
                .await
                .unwrap();
        }
    }

    fn movie(id: &str, rating: Option<f64>) -> MovieRow {
        MovieRow {
            imdb_id: id.to_string(),
            primary_title: Some(format!("Title {}", id)),
            original_title: Some(format!("Title {}", id)),
            genre: Some(vec!["Drama".to_string()]),
            start_year: Some(1994),
            average_rating: rating,
            num_votes: Some(3_000_000_000),
        }
    }

    #[tokio::test]
    async fn create_table_is_idempotent_and_keeps_rows() {
        let Some(db) = TestDb::start("create").await else {
            return;
        };

        db.store.create_table().await.unwrap();
        assert!(db.store.insert_if_absent(&movie("tt1", Some(9.0))).await.unwrap());
        db.store.create_table().await.unwrap();

        assert_eq!(db.count().await, 1);
        db.drop_schema().await;
    }

    #[tokio::test]
    async fn existing_imdb_id_is_never_overwritten() {
        let Some(db) = TestDb::start("conflict").await else {
            return;
        };
        db.store.create_table().await.unwrap();

        assert!(db.store.insert_if_absent(&movie("tt1", Some(9.0))).await.unwrap());
        assert!(!db.store.insert_if_absent(&movie("tt1", Some(1.0))).await.unwrap());

        let rows = db.store.top_rated(10).await.unwrap();
        assert_eq!(rows, vec![movie("tt1", Some(9.0))]);
        db.drop_schema().await;
    }

    #[tokio::test]
    async fn top_rated_orders_by_rating_with_nulls_last() {
        let Some(db) = TestDb::start("top").await else {
            return;
        };
        db.store.create_table().await.unwrap();
        for row in [
            movie("tt1", Some(7.0)),
            movie("tt2", None),
            movie("tt3", Some(9.0)),
            movie("tt4", Some(8.0)),
        ] {
            db.store.insert_if_absent(&row).await.unwrap();
        }

        let ids = |rows: Vec<MovieRow>| rows.into_iter().map(|m| m.imdb_id).collect::<Vec<_>>();
        assert_eq!(ids(db.store.top_rated(3).await.unwrap()), vec!["tt3", "tt4", "tt1"]);
        assert_eq!(
            ids(db.store.top_rated(10).await.unwrap()),
            vec!["tt3", "tt4", "tt1", "tt2"]
        );
        db.drop_schema().await;
    }

    #[tokio::test]
    async fn failed_batch_commits_nothing() {
        let Some(db) = TestDb::start("batch").await else {
            return;
        };
        db.store.create_table().await.unwrap();
        db.execute("ALTER TABLE movies ADD CONSTRAINT rating_scale CHECK (average_rating <= 10)")
            .await;

        let batch = vec![movie("tt1", Some(9.0)), movie("tt2", Some(11.0))];
        let err = db.store.insert_all_if_absent(&batch).await.unwrap_err();
        assert!(matches!(err, crate::Error::Storage(_)));
        assert_eq!(db.count().await, 0);

        let inserted = db
            .store
            .insert_all_if_absent(&[movie("tt1", Some(9.0)), movie("tt1", Some(8.0))])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        db.drop_schema().await;
    }

    #[tokio::test]
    async fn reads_tables_created_by_the_older_layout() {
        let Some(db) = TestDb::start("legacy").await else {
            return;
        };
        db.execute(LEGACY_CREATE_TABLE_SQL).await;
        db.execute("INSERT INTO movies (imdb_id, average_rating, num_votes) VALUES (NULL, 9.9, 5)")
            .await;
        db.store.create_table().await.unwrap();

        let mut row = movie("tt1", Some(9.0));
        row.num_votes = Some(2_900_000);
        assert!(db.store.insert_if_absent(&row).await.unwrap());

        let rows = db.store.top_rated(200).await.unwrap();
        assert_eq!(rows, vec![row]);
        db.drop_schema().await;
    }
}
