pub mod manager;
pub mod postgres;
pub mod schema;
pub mod sqlite;

pub use manager::{DatabaseManager, DatabasePool, DatabaseType};
pub use postgres::PostgresCoordActionRepository;
pub use sqlite::SqliteCoordActionRepository;
