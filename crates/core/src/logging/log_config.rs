use crate::logging::log_level::LogLevel;

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,
    /// Output format for logs
    pub format: OutputFormat,
    /// Whether to include the event target (module path)
    #[serde(default = "default_include_target")]
    pub include_target: bool,
}

fn default_include_target() -> bool {
    true
}

/// Output format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// Plain text format
    Text,
    /// Multi-line human readable format
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "pretty" => Ok(OutputFormat::Pretty),
            other => Err(format!("不支持的日志格式: {other}")),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: OutputFormat::Pretty,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// `LOG_LEVEL` / `LOG_FORMAT` 环境变量覆盖配置文件中的值，无法解析的值被忽略
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if let Ok(level) = level.parse::<LogLevel>() {
                self.level = level;
            }
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            if let Ok(format) = format.parse::<OutputFormat>() {
                self.format = format;
            }
        }

        self
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.format == OutputFormat::Json && !self.include_target {
            return Err("JSON log output requires include_target".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = LogConfig::with_level(LogLevel::Debug).with_format(OutputFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
