use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use coordinator_core::DatabaseConfig;
use coordinator_domain::repositories::CoordinatorActionRepository;
use coordinator_errors::CoordResult;
use tracing::{debug, info};

use super::postgres::PostgresCoordActionRepository;
use super::schema::{POSTGRES_SCHEMA, SQLITE_SCHEMA};
use super::sqlite::SqliteCoordActionRepository;

/// Database type detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// Every connection to an in-memory SQLite URL opens a separate, empty database
fn is_in_memory_sqlite(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Database connection pool
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// Create pool from configuration with automatic type detection
    pub async fn new(config: &DatabaseConfig) -> CoordResult<Self> {
        let acquire_timeout = Duration::from_secs(config.connection_timeout_seconds);
        let idle_timeout = Duration::from_secs(config.idle_timeout_seconds);

        match DatabaseType::from_url(&config.url) {
            DatabaseType::PostgreSQL => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(acquire_timeout)
                    .idle_timeout(idle_timeout)
                    .connect(&config.url)
                    .await?;
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                let options =
                    sqlx::sqlite::SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

                let pool_options = if is_in_memory_sqlite(&config.url) {
                    // 内存库只能保留单个常驻连接
                    sqlx::sqlite::SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    sqlx::sqlite::SqlitePoolOptions::new()
                        .max_connections(config.max_connections)
                        .min_connections(config.min_connections)
                        .idle_timeout(idle_timeout)
                };

                let pool = pool_options
                    .acquire_timeout(acquire_timeout)
                    .connect_with(options)
                    .await?;
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    pub async fn health_check(&self) -> CoordResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }
}

/// Unified database manager
pub struct DatabaseManager {
    pool: DatabasePool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> CoordResult<Self> {
        let pool = DatabasePool::new(config).await?;
        info!("数据库连接池已建立: {:?}", pool.database_type());
        Ok(Self { pool })
    }

    pub fn database_type(&self) -> DatabaseType {
        self.pool.database_type()
    }

    /// Create the action table and its index when they do not exist yet
    pub async fn migrate(&self) -> CoordResult<()> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => {
                for statement in POSTGRES_SCHEMA {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
            DatabasePool::SQLite(pool) => {
                for statement in SQLITE_SCHEMA {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
        }
        debug!("数据库表结构迁移完成");
        Ok(())
    }

    pub async fn health_check(&self) -> CoordResult<()> {
        self.pool.health_check().await
    }

    pub async fn close(&self) {
        self.pool.close().await
    }

    /// Factory method for the coordinator action repository
    pub fn action_repository(&self) -> Arc<dyn CoordinatorActionRepository> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => {
                Arc::new(PostgresCoordActionRepository::new(pool.clone()))
            }
            DatabasePool::SQLite(pool) => Arc::new(SqliteCoordActionRepository::new(pool.clone())),
        }
    }
}
