use async_trait::async_trait;
use chrono::Utc;
use coordinator_domain::{
    action_query_builder::{ActionQuery, ActionQueryParam, SqlDialect, ACTIONS_TABLE, ACTION_COLUMNS},
    entities::{CoordinatorAction, CoordinatorActionStatus},
    repositories::CoordinatorActionRepository,
};
use coordinator_errors::CoordResult;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::{
    action_context,
    error_handling::{ActionOperationContext, RepositoryErrorHelpers, RepositoryOperation},
};

pub struct SqliteCoordActionRepository {
    pool: SqlitePool,
}

impl SqliteCoordActionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_action(row: &sqlx::sqlite::SqliteRow) -> CoordResult<CoordinatorAction> {
        Ok(CoordinatorAction {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            action_number: row.try_get("action_number")?,
            action_type: row.try_get("action_type")?,
            status: row.try_get("status")?,
            nominal_time: row.try_get("nominal_time")?,
            created_time: row.try_get("created_time")?,
            last_modified_time: row.try_get("last_modified_time")?,
            external_id: row.try_get("external_id")?,
            external_status: row.try_get("external_status")?,
            tracker_uri: row.try_get("tracker_uri")?,
            console_url: row.try_get("console_url")?,
            missing_dependencies: row.try_get("missing_dependencies")?,
            timeout: row.try_get("timeout")?,
            action_xml: row.try_get("action_xml")?,
            created_conf: row.try_get("created_conf")?,
            run_conf: row.try_get("run_conf")?,
            sla_xml: row.try_get("sla_xml")?,
            pending: row.try_get("pending")?,
            error_code: row.try_get("error_code")?,
            error_message: row.try_get("error_message")?,
            push_missing_dependencies: row.try_get("push_missing_dependencies")?,
            rerun_time: row.try_get("rerun_time")?,
        })
    }

    fn bind_query_params<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        params: &'q [ActionQueryParam],
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        for param in params.iter() {
            query = match param {
                ActionQueryParam::Text(value) => query.bind(value.as_str()),
                ActionQueryParam::Status(status) => query.bind(*status),
                ActionQueryParam::Int64(value) => query.bind(*value),
            };
        }
        query
    }
}

#[async_trait]
impl CoordinatorActionRepository for SqliteCoordActionRepository {
    #[instrument(skip(self, action), fields(
        action_id = %action.id,
        job_id = %action.job_id,
        status = %action.status,
    ))]
    async fn create(&self, action: &CoordinatorAction) -> CoordResult<CoordinatorAction> {
        let context = action_context!(
            RepositoryOperation::Create,
            action_id = &action.id,
            job_id = &action.job_id
        )
        .with_status(action.status);

        let sql = format!(
            "INSERT INTO {ACTIONS_TABLE} ({ACTION_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {ACTION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&action.id)
            .bind(&action.job_id)
            .bind(action.action_number)
            .bind(&action.action_type)
            .bind(action.status)
            .bind(action.nominal_time)
            .bind(action.created_time)
            .bind(action.last_modified_time)
            .bind(&action.external_id)
            .bind(&action.external_status)
            .bind(&action.tracker_uri)
            .bind(&action.console_url)
            .bind(&action.missing_dependencies)
            .bind(action.timeout)
            .bind(&action.action_xml)
            .bind(&action.created_conf)
            .bind(&action.run_conf)
            .bind(&action.sla_xml)
            .bind(action.pending)
            .bind(&action.error_code)
            .bind(&action.error_message)
            .bind(&action.push_missing_dependencies)
            .bind(action.rerun_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::action_database_error(context.clone(), e))?;

        let created = Self::row_to_action(&row)?;
        RepositoryErrorHelpers::log_operation_success(
            context,
            &created.entity_description(),
            Some(&format!("状态: {}", created.status)),
        );
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> CoordResult<Option<CoordinatorAction>> {
        let context = action_context!(RepositoryOperation::Read, action_id = id);

        let sql = format!("SELECT {ACTION_COLUMNS} FROM {ACTIONS_TABLE} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::action_database_error(context, e))?;

        match row {
            Some(row) => Ok(Some(Self::row_to_action(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: &str, status: CoordinatorActionStatus) -> CoordResult<()> {
        let context =
            action_context!(RepositoryOperation::Update, action_id = id).with_status(status);

        let result = sqlx::query(
            "UPDATE coord_actions SET status = ?, last_modified_time = ? WHERE id = ?",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::action_database_error(context.clone(), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryErrorHelpers::action_not_found(context));
        }

        debug!("更新协调器动作状态成功: ID {}, 状态 {}", id, status);
        Ok(())
    }

    #[instrument(skip(self, query), fields(job_id = ?query.job_id(), window = ?query.window()))]
    async fn find_actions(&self, query: &ActionQuery) -> CoordResult<Vec<CoordinatorAction>> {
        let context = ActionOperationContext::for_query(RepositoryOperation::Query, query);

        let (sql, params) = query.build_select_query(SqlDialect::Sqlite);
        let rows = Self::bind_query_params(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::action_database_error(context, e))?;

        rows.iter().map(Self::row_to_action).collect()
    }

    #[instrument(skip(self, query), fields(job_id = ?query.job_id()))]
    async fn count_actions(&self, query: &ActionQuery) -> CoordResult<i64> {
        let context = ActionOperationContext::for_query(RepositoryOperation::Count, query);

        let (sql, params) = query.build_count_query(SqlDialect::Sqlite);
        let row = Self::bind_query_params(sqlx::query(&sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::action_database_error(context, e))?;

        Ok(row.try_get("total")?)
    }
}
