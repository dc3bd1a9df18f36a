//! # 领域服务
//!
//! 协调器动作子集查询：按作业、状态与分页窗口读取动作快照。
//! 服务本身无状态，每次调用只对仓储发起一次读取。

use std::sync::Arc;

use coordinator_errors::{CoordError, CoordResult};
use tracing::{debug, instrument};

use crate::action_query_builder::ActionQuery;
use crate::entities::CoordinatorActionView;
use crate::repositories::CoordinatorActionRepository;
use crate::value_objects::{ActionWindow, StatusFilter};

/// Paginated, status-filtered reads of a coordinator job's actions
pub struct ActionSubsetQuery {
    repository: Arc<dyn CoordinatorActionRepository>,
}

impl ActionSubsetQuery {
    pub fn new(repository: Arc<dyn CoordinatorActionRepository>) -> Self {
        Self { repository }
    }

    /// Rows `start ..= start + len - 1` (1-based) of the job's actions in
    /// nominal-time order, restricted to `status_filters` when it is non-empty.
    ///
    /// Every failure, including an unknown status or `start == 0`, is
    /// reported as [`CoordError::QueryExecutionFailed`] and no rows are returned.
    #[instrument(skip(self, status_filters), fields(filters = status_filters.len()))]
    pub async fn fetch<S: AsRef<str> + Sync>(
        &self,
        job_id: &str,
        status_filters: &[S],
        start: u32,
        len: u32,
    ) -> CoordResult<Vec<CoordinatorActionView>> {
        let filter = StatusFilter::parse(status_filters).map_err(CoordError::query_failed)?;
        let window = ActionWindow::new(start, len).map_err(CoordError::query_failed)?;
        self.fetch_window(job_id, &filter, window).await
    }

    pub async fn fetch_window(
        &self,
        job_id: &str,
        filter: &StatusFilter,
        window: ActionWindow,
    ) -> CoordResult<Vec<CoordinatorActionView>> {
        let query = ActionQuery::for_job(job_id)
            .with_status_filter(filter)
            .with_window(window);

        let actions = self
            .repository
            .find_actions(&query)
            .await
            .map_err(CoordError::query_failed)?;

        debug!(
            "查询协调器作业 {} 的动作: 起始 {}, 长度 {}, 返回 {} 条",
            job_id,
            window.start(),
            window.len(),
            actions.len()
        );

        Ok(actions.iter().map(CoordinatorActionView::from).collect())
    }

    /// Total number of actions the same filter would page through
    pub async fn count<S: AsRef<str> + Sync>(
        &self,
        job_id: &str,
        status_filters: &[S],
    ) -> CoordResult<i64> {
        let filter = StatusFilter::parse(status_filters).map_err(CoordError::query_failed)?;
        let query = ActionQuery::for_job(job_id).with_status_filter(&filter);
        self.repository
            .count_actions(&query)
            .await
            .map_err(CoordError::query_failed)
    }
}
