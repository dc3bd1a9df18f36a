pub mod app_config;
pub mod database;
pub mod query;

// Re-export main types for easier imports
pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use query::QueryConfig;
