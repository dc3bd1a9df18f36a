use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{database::DatabaseConfig, query::QueryConfig};
use crate::config::{DEFAULT_CONFIG_PATHS, ENV_PREFIX};
use crate::logging::LogConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.url", "sqlite:coordinator.db")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connection_timeout_seconds", 30)?
            .set_default("database.idle_timeout_seconds", 600)?
            .set_default("query.default_page_size", 50)?
            .set_default("query.max_page_size", 1000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        // COORDINATOR_DATABASE__URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置无效")?;
        self.query.validate().context("查询配置无效")?;
        self.logging
            .validate()
            .map_err(|e| anyhow::anyhow!("日志配置无效: {e}"))?;
        Ok(())
    }
}
