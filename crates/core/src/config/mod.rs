//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、TOML配置文件、`COORDINATOR_` 前缀的环境变量。
//! 加载完成后统一执行校验，校验失败时拒绝启动。

pub mod models;

pub use models::{AppConfig, DatabaseConfig, QueryConfig};

/// 默认配置文件查找路径
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/coordinator.toml",
    "coordinator.toml",
    "/etc/coordinator/config.toml",
];

/// 环境变量前缀，例如 `COORDINATOR_DATABASE__URL`
pub const ENV_PREFIX: &str = "COORDINATOR";
