use thiserror::Error;

pub mod config;
pub mod env_boot;
pub mod models;
pub mod storage;
pub mod telemetry;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] rquest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The movie-data provider answered with something other than 200.
    #[error("External service error: status {status}: {body}")]
    ExternalService { status: u16, body: String },

    /// A raw record lacks a key the canonical row needs.
    #[error("Missing field `{field}` in raw record {index}")]
    MissingField { index: usize, field: String },

    #[error("Invalid field `{field}` in raw record {index}: expected {expected}")]
    InvalidField {
        index: usize,
        field: String,
        expected: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
