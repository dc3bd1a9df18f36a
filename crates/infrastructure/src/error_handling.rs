//! Repository error handling with operation context
//!
//! Database failures are logged with the action and operation they belong to,
//! then returned with the original `sqlx::Error` kept as the source.

use chrono::{DateTime, Utc};
use coordinator_domain::{action_query_builder::ActionQuery, entities::CoordinatorActionStatus};
use coordinator_errors::CoordError;
use sqlx::Error as SqlxError;
use std::fmt;
use tracing::{error, info, instrument};

/// Operation context for repository operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Create,
    Read,
    Update,
    Query,
    Count,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::Read => write!(f, "查询"),
            RepositoryOperation::Update => write!(f, "更新"),
            RepositoryOperation::Query => write!(f, "查询"),
            RepositoryOperation::Count => write!(f, "统计"),
        }
    }
}

/// Context information for coordinator action repository operations
#[derive(Debug, Clone)]
pub struct ActionOperationContext {
    pub operation: RepositoryOperation,
    pub action_id: Option<String>,
    pub job_id: Option<String>,
    pub status: Option<CoordinatorActionStatus>,
    pub timestamp: DateTime<Utc>,
    pub additional_info: Option<String>,
}

impl ActionOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            action_id: None,
            job_id: None,
            status: None,
            timestamp: Utc::now(),
            additional_info: None,
        }
    }

    /// Context of a structured query: its job plus the rendered predicates
    pub fn for_query(operation: RepositoryOperation, query: &ActionQuery) -> Self {
        let context =
            Self::new(operation).with_additional_info(format!("{:?}", query.predicates()));
        match query.job_id() {
            Some(job_id) => context.with_job_id(job_id),
            None => context,
        }
    }

    pub fn with_action_id(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_status(mut self, status: CoordinatorActionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    pub fn entity_description(&self) -> String {
        match (&self.action_id, &self.job_id) {
            (Some(id), Some(job_id)) => format!("协调器动作 '{id}' (作业: {job_id})"),
            (Some(id), None) => format!("协调器动作 '{id}'"),
            (None, Some(job_id)) => format!("协调器作业 '{job_id}' 的动作"),
            (None, None) => "协调器动作".to_string(),
        }
    }
}

/// Error helpers for repository operations
pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    /// Log a database error with action context and keep it as the error source
    #[instrument(skip_all, fields(
        operation = %context.operation,
        action_id = ?context.action_id,
        job_id = ?context.job_id,
        status = ?context.status,
        timestamp = %context.timestamp,
    ))]
    pub fn action_database_error(context: ActionOperationContext, error: SqlxError) -> CoordError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        let error_msg = match &error {
            SqlxError::Database(db_error) => match db_error.constraint() {
                Some(constraint) if constraint.contains("pkey") => format!(
                    "{operation_desc}{entity_desc}时发生主键冲突: 动作ID '{}' 已存在",
                    context.action_id.as_deref().unwrap_or("未知")
                ),
                Some(constraint) => {
                    format!("{operation_desc}{entity_desc}时发生数据库约束冲突: {constraint}")
                }
                None => format!("{operation_desc}{entity_desc}时发生数据库错误: {db_error}"),
            },
            SqlxError::PoolClosed => format!("{operation_desc}{entity_desc}时数据库连接池已关闭"),
            SqlxError::PoolTimedOut => format!("{operation_desc}{entity_desc}时数据库连接池超时"),
            SqlxError::Io(io_error) => {
                format!("{operation_desc}{entity_desc}时发生I/O错误: {io_error}")
            }
            SqlxError::ColumnDecode { index, source } => {
                format!("{operation_desc}{entity_desc}时解码列 {index} 失败: {source}")
            }
            _ => format!("{operation_desc}{entity_desc}时发生未知数据库错误: {error}"),
        };

        match &context.additional_info {
            Some(info) => error!(error = %error, info = %info, "{}", error_msg),
            None => error!(error = %error, "{}", error_msg),
        }
        CoordError::Database(error)
    }

    /// Create an action not found error with context
    pub fn action_not_found(context: ActionOperationContext) -> CoordError {
        let entity_desc = context.entity_description();
        error!("{}{}时未找到: {} 不存在", context.operation, entity_desc, entity_desc);
        CoordError::action_not_found(context.action_id.unwrap_or_default())
    }

    /// Log successful repository operation
    #[instrument(skip_all, fields(
        operation = %context.operation,
        entity_desc = %entity_desc,
        timestamp = %context.timestamp,
    ))]
    pub fn log_operation_success(
        context: ActionOperationContext,
        entity_desc: &str,
        additional_info: Option<&str>,
    ) {
        let base_msg = format!("{}{}成功", context.operation, entity_desc);

        if let Some(info) = additional_info {
            info!("{}: {}", base_msg, info);
        } else {
            info!("{}", base_msg);
        }
    }
}

/// Macro for creating action operation context easily
#[macro_export]
macro_rules! action_context {
    ($operation:expr) => {
        $crate::error_handling::ActionOperationContext::new($operation)
    };
    ($operation:expr, action_id = $action_id:expr) => {
        $crate::error_handling::ActionOperationContext::new($operation).with_action_id($action_id)
    };
    ($operation:expr, job_id = $job_id:expr) => {
        $crate::error_handling::ActionOperationContext::new($operation).with_job_id($job_id)
    };
    ($operation:expr, action_id = $action_id:expr, job_id = $job_id:expr) => {
        $crate::error_handling::ActionOperationContext::new($operation)
            .with_action_id($action_id)
            .with_job_id($job_id)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_description() {
        let context = action_context!(RepositoryOperation::Read, action_id = "job@1", job_id = "job");
        assert_eq!(context.entity_description(), "协调器动作 'job@1' (作业: job)");

        let context = action_context!(RepositoryOperation::Query, job_id = "job");
        assert_eq!(context.entity_description(), "协调器作业 'job' 的动作");

        let query = ActionQuery::for_job("job");
        let context = ActionOperationContext::for_query(RepositoryOperation::Count, &query);
        assert_eq!(context.job_id.as_deref(), Some("job"));
        assert_eq!(context.entity_description(), "协调器作业 'job' 的动作");
        assert!(context.additional_info.unwrap().contains("JobIdEquals"));

        assert_eq!(
            action_context!(RepositoryOperation::Count).entity_description(),
            "协调器动作"
        );
    }

    #[test]
    fn test_database_error_keeps_source() {
        let context = action_context!(RepositoryOperation::Query, job_id = "job")
            .with_additional_info("起始 1, 长度 50");
        let err = RepositoryErrorHelpers::action_database_error(context, SqlxError::PoolTimedOut);

        assert!(matches!(err, CoordError::Database(SqlxError::PoolTimedOut)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_carries_action_id() {
        let context = action_context!(RepositoryOperation::Update, action_id = "job@9")
            .with_status(CoordinatorActionStatus::Killed);
        let err = RepositoryErrorHelpers::action_not_found(context);
        assert!(matches!(err, CoordError::ActionNotFound { ref id } if id == "job@9"));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(RepositoryOperation::Create.to_string(), "创建");
        assert_eq!(RepositoryOperation::Count.to_string(), "统计");
    }
}
