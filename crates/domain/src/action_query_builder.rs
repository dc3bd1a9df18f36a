//! Coordinator action query construction
//!
//! A query is kept as typed parts (predicates, ordering, window) until it is
//! rendered for a concrete SQL dialect. Every caller-supplied value is emitted
//! as a bind placeholder and returned alongside the SQL text.

use crate::entities::CoordinatorActionStatus;
use crate::value_objects::{ActionWindow, StatusFilter};

pub const ACTIONS_TABLE: &str = "coord_actions";

/// Column list shared by every action SELECT, in row-mapping order
pub const ACTION_COLUMNS: &str = "id, job_id, action_number, action_type, status, nominal_time, \
     created_time, last_modified_time, external_id, external_status, tracker_uri, console_url, \
     missing_dependencies, timeout, action_xml, created_conf, run_conf, sla_xml, pending, \
     error_code, error_message, push_missing_dependencies, rerun_time";

/// SQL dialect, decides placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// Placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${index}"),
            SqlDialect::Sqlite => "?".to_string(),
        }
    }
}

/// A single WHERE condition; conditions are always AND-ed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPredicate {
    JobIdEquals(String),
    StatusIn(Vec<CoordinatorActionStatus>),
}

/// ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionOrdering {
    /// Canonical retrieval order; action number breaks ties between equal nominal times
    #[default]
    NominalTimeAsc,
}

impl ActionOrdering {
    fn as_sql(&self) -> &'static str {
        match self {
            ActionOrdering::NominalTimeAsc => "nominal_time ASC, action_number ASC",
        }
    }
}

/// Query parameter types for type-safe parameter binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionQueryParam {
    Text(String),
    Status(CoordinatorActionStatus),
    Int64(i64),
}

/// Structured query over the actions of coordinator jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQuery {
    predicates: Vec<ActionPredicate>,
    ordering: ActionOrdering,
    window: Option<ActionWindow>,
}

impl ActionQuery {
    /// All actions of `job_id` ordered by nominal time
    pub fn for_job(job_id: &str) -> Self {
        Self {
            predicates: vec![ActionPredicate::JobIdEquals(job_id.to_string())],
            ordering: ActionOrdering::NominalTimeAsc,
            window: None,
        }
    }

    /// Restrict to the filter's statuses; an empty filter leaves the query unchanged
    pub fn with_status_filter(mut self, filter: &StatusFilter) -> Self {
        if !filter.is_empty() {
            self.predicates
                .push(ActionPredicate::StatusIn(filter.statuses().to_vec()));
        }
        self
    }

    pub fn with_window(mut self, window: ActionWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// The job the query is scoped to
    pub fn job_id(&self) -> Option<&str> {
        self.predicates.iter().find_map(|predicate| match predicate {
            ActionPredicate::JobIdEquals(job_id) => Some(job_id.as_str()),
            _ => None,
        })
    }

    pub fn predicates(&self) -> &[ActionPredicate] {
        &self.predicates
    }

    pub fn window(&self) -> Option<ActionWindow> {
        self.window
    }

    /// Render `SELECT ... WHERE ... ORDER BY ... [LIMIT ... OFFSET ...]`
    pub fn build_select_query(&self, dialect: SqlDialect) -> (String, Vec<ActionQueryParam>) {
        let mut params = Vec::new();
        let mut query = format!("SELECT {ACTION_COLUMNS} FROM {ACTIONS_TABLE}");
        self.push_where(&mut query, &mut params, dialect);

        query.push_str(" ORDER BY ");
        query.push_str(self.ordering.as_sql());

        if let Some(window) = self.window {
            params.push(ActionQueryParam::Int64(window.limit()));
            query.push_str(" LIMIT ");
            query.push_str(&dialect.placeholder(params.len()));

            params.push(ActionQueryParam::Int64(window.offset()));
            query.push_str(" OFFSET ");
            query.push_str(&dialect.placeholder(params.len()));
        }

        (query, params)
    }

    /// Render `SELECT COUNT(*) ... WHERE ...`; ordering and window do not apply
    pub fn build_count_query(&self, dialect: SqlDialect) -> (String, Vec<ActionQueryParam>) {
        let mut params = Vec::new();
        let mut query = format!("SELECT COUNT(*) AS total FROM {ACTIONS_TABLE}");
        self.push_where(&mut query, &mut params, dialect);
        (query, params)
    }

    fn push_where(&self, query: &mut String, params: &mut Vec<ActionQueryParam>, dialect: SqlDialect) {
        let mut first = true;
        for predicate in &self.predicates {
            // an IN () list is invalid SQL, an empty status set means "no restriction"
            if matches!(predicate, ActionPredicate::StatusIn(statuses) if statuses.is_empty()) {
                continue;
            }

            query.push_str(if first { " WHERE " } else { " AND " });
            first = false;

            match predicate {
                ActionPredicate::JobIdEquals(job_id) => {
                    params.push(ActionQueryParam::Text(job_id.clone()));
                    query.push_str("job_id = ");
                    query.push_str(&dialect.placeholder(params.len()));
                }
                ActionPredicate::StatusIn(statuses) => {
                    let placeholders: Vec<String> = statuses
                        .iter()
                        .map(|status| {
                            params.push(ActionQueryParam::Status(*status));
                            dialect.placeholder(params.len())
                        })
                        .collect();
                    query.push_str("status IN (");
                    query.push_str(&placeholders.join(", "));
                    query.push(')');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_query_has_no_status_clause() {
        let query = ActionQuery::for_job("job-1").with_status_filter(&StatusFilter::any());
        let (sql, params) = query.build_select_query(SqlDialect::Postgres);

        assert_eq!(
            sql,
            format!(
                "SELECT {ACTION_COLUMNS} FROM coord_actions WHERE job_id = $1 \
                 ORDER BY nominal_time ASC, action_number ASC"
            )
        );
        assert_eq!(params, vec![ActionQueryParam::Text("job-1".to_string())]);
    }

    #[test]
    fn test_status_clause_precedes_ordering_and_window() {
        let filter = StatusFilter::parse(&["RUNNING", "KILLED"]).unwrap();
        let query = ActionQuery::for_job("job-1")
            .with_status_filter(&filter)
            .with_window(ActionWindow::new(11, 5).unwrap());
        let (sql, params) = query.build_select_query(SqlDialect::Postgres);

        assert!(sql.ends_with(
            "WHERE job_id = $1 AND status IN ($2, $3) \
             ORDER BY nominal_time ASC, action_number ASC LIMIT $4 OFFSET $5"
        ));
        assert_eq!(
            params,
            vec![
                ActionQueryParam::Text("job-1".to_string()),
                ActionQueryParam::Status(CoordinatorActionStatus::Running),
                ActionQueryParam::Status(CoordinatorActionStatus::Killed),
                ActionQueryParam::Int64(5),
                ActionQueryParam::Int64(10),
            ]
        );
    }

    #[test]
    fn test_job_id_is_never_inlined() {
        let hostile = "x' OR '1'='1";
        let (sql, params) = ActionQuery::for_job(hostile).build_select_query(SqlDialect::Sqlite);

        assert!(!sql.contains(hostile));
        assert_eq!(params[0], ActionQueryParam::Text(hostile.to_string()));
    }

    #[test]
    fn test_job_id_containing_order_keyword() {
        // the old splice-before-"order" approach broke on values like this one
        let (sql, _) = ActionQuery::for_job("reorder-job")
            .with_status_filter(&StatusFilter::parse(&["READY"]).unwrap())
            .build_select_query(SqlDialect::Postgres);

        assert!(sql.contains("WHERE job_id = $1 AND status IN ($2) ORDER BY"));
    }

    #[test]
    fn test_sqlite_placeholders() {
        let filter = StatusFilter::parse(&["WAITING"]).unwrap();
        let (sql, params) = ActionQuery::for_job("job-2")
            .with_status_filter(&filter)
            .with_window(ActionWindow::default())
            .build_select_query(SqlDialect::Sqlite);

        assert!(sql.contains("WHERE job_id = ? AND status IN (?)"));
        assert!(sql.ends_with("LIMIT ? OFFSET ?"));
        assert_eq!(params.len(), 4);
        assert_eq!(params[2], ActionQueryParam::Int64(50));
        assert_eq!(params[3], ActionQueryParam::Int64(0));
    }

    #[test]
    fn test_count_query_ignores_window() {
        let filter = StatusFilter::parse(&["FAILED"]).unwrap();
        let (sql, params) = ActionQuery::for_job("job-3")
            .with_status_filter(&filter)
            .with_window(ActionWindow::new(3, 3).unwrap())
            .build_count_query(SqlDialect::Postgres);

        assert_eq!(
            sql,
            "SELECT COUNT(*) AS total FROM coord_actions WHERE job_id = $1 AND status IN ($2)"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_job_id_accessor() {
        let filter = StatusFilter::parse(&["RUNNING"]).unwrap();
        let query = ActionQuery::for_job("job-5").with_status_filter(&filter);
        assert_eq!(query.job_id(), Some("job-5"));
    }
}
