//! SQLite persistence: pool construction, embedded migrations, repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
