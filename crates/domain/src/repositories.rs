//! 领域仓储抽象
//!
//! 定义协调器动作存储的抽象接口，具体实现位于基础设施层

use async_trait::async_trait;
use coordinator_errors::CoordResult;

use crate::action_query_builder::ActionQuery;
use crate::entities::{CoordinatorAction, CoordinatorActionStatus};

/// 协调器动作仓储抽象
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoordinatorActionRepository: Send + Sync {
    async fn create(&self, action: &CoordinatorAction) -> CoordResult<CoordinatorAction>;
    async fn get_by_id(&self, id: &str) -> CoordResult<Option<CoordinatorAction>>;
    /// Status transition; also bumps `last_modified_time`
    async fn update_status(&self, id: &str, status: CoordinatorActionStatus) -> CoordResult<()>;
    /// Execute a structured action query in a single read
    async fn find_actions(&self, query: &ActionQuery) -> CoordResult<Vec<CoordinatorAction>>;
    async fn count_actions(&self, query: &ActionQuery) -> CoordResult<i64>;
}
