pub mod loader;
pub mod schema;

pub use loader::{LoadReport, load, load_atomic};
pub use schema::ensure_schema;
