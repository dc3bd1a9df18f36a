pub mod config;
pub mod logging;

pub use config::models::{AppConfig, DatabaseConfig, QueryConfig};
pub use coordinator_errors::{CoordError, CoordResult};
pub use logging::{init_logging, LogConfig, LogLevel, OutputFormat};
