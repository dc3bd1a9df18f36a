use thiserror::Error;

/// 协调器动作查询失败的错误码
pub const E0603_QUERY_EXECUTION_FAILED: &str = "E0603";
/// 作业定义缺少必需参数的错误码
pub const E0738_MISSING_PARAMETERS: &str = "E0738";

#[derive(Debug, Error)]
pub enum CoordError {
    /// 原因只通过 `source()` 暴露，不重复写入消息
    #[error("[E0603] 协调器动作查询执行失败")]
    QueryExecutionFailed {
        #[source]
        source: Box<CoordError>,
    },
    #[error("[E0738] 缺少 {count} 个必需参数且未声明默认值: {}", .names.join(", "))]
    MissingParameters { count: usize, names: Vec<String> },
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("无效的状态过滤器: {0}")]
    InvalidStatusFilter(String),
    #[error("无效的分页参数: {0}")]
    InvalidPagination(String),
    #[error("协调器动作未找到: {id}")]
    ActionNotFound { id: String },
    #[error("作业定义解析失败: {0}")]
    DefinitionParse(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type CoordResult<T> = Result<T, CoordError>;

impl CoordError {
    /// Wrap any failure of the action-subset query into the single E0603 kind.
    ///
    /// An error that is already a query failure is returned unchanged so the
    /// cause chain never nests E0603 inside E0603.
    pub fn query_failed(cause: CoordError) -> Self {
        match cause {
            already @ CoordError::QueryExecutionFailed { .. } => already,
            other => Self::QueryExecutionFailed {
                source: Box::new(other),
            },
        }
    }
    pub fn missing_parameters(names: Vec<String>) -> Self {
        Self::MissingParameters {
            count: names.len(),
            names,
        }
    }
    pub fn invalid_status_filter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidStatusFilter(msg.into())
    }
    pub fn invalid_pagination<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPagination(msg.into())
    }
    pub fn action_not_found<S: Into<String>>(id: S) -> Self {
        Self::ActionNotFound { id: id.into() }
    }
    pub fn definition_parse<S: Into<String>>(msg: S) -> Self {
        Self::DefinitionParse(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            CoordError::QueryExecutionFailed { .. } => Some(E0603_QUERY_EXECUTION_FAILED),
            CoordError::MissingParameters { .. } => Some(E0738_MISSING_PARAMETERS),
            _ => None,
        }
    }
    pub fn is_retryable(&self) -> bool {
        match self {
            CoordError::Database(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            CoordError::QueryExecutionFailed { source } => source.is_retryable(),
            _ => false,
        }
    }
    pub fn user_message(&self) -> &str {
        match self {
            CoordError::MissingParameters { .. } => "作业配置缺少必需参数",
            CoordError::InvalidStatusFilter(_) => "状态过滤条件有误",
            CoordError::InvalidPagination(_) => "分页参数有误",
            CoordError::ActionNotFound { .. } => "请求的协调器动作不存在",
            CoordError::DefinitionParse(_) => "作业定义文档格式有误",
            CoordError::QueryExecutionFailed { source } => match source.as_ref() {
                CoordError::InvalidStatusFilter(_) | CoordError::InvalidPagination(_) => {
                    source.user_message()
                }
                _ => "查询协调器动作失败，请稍后重试",
            },
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for CoordError {
    fn from(err: serde_json::Error) -> Self {
        CoordError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for CoordError {
    fn from(err: anyhow::Error) -> Self {
        CoordError::Internal(err.to_string())
    }
}
