//! 协调器动作表结构
//!
//! 两种数据库使用相同的表名与列名，列顺序与 [`ACTION_COLUMNS`] 一致。
//!
//! [`ACTION_COLUMNS`]: coordinator_domain::action_query_builder::ACTION_COLUMNS

pub const SQLITE_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS coord_actions (
        id TEXT PRIMARY KEY,
        job_id TEXT NOT NULL,
        action_number INTEGER NOT NULL,
        action_type TEXT,
        status TEXT NOT NULL DEFAULT 'WAITING',
        nominal_time TEXT NOT NULL,
        created_time TEXT NOT NULL,
        last_modified_time TEXT NOT NULL,
        external_id TEXT,
        external_status TEXT,
        tracker_uri TEXT,
        console_url TEXT,
        missing_dependencies TEXT,
        timeout INTEGER NOT NULL DEFAULT -1,
        action_xml TEXT,
        created_conf TEXT,
        run_conf TEXT,
        sla_xml TEXT,
        pending INTEGER NOT NULL DEFAULT 0,
        error_code TEXT,
        error_message TEXT,
        push_missing_dependencies TEXT,
        rerun_time TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_coord_actions_job_nominal ON coord_actions (job_id, nominal_time)",
];

pub const POSTGRES_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS coord_actions (
        id VARCHAR(255) PRIMARY KEY,
        job_id VARCHAR(255) NOT NULL,
        action_number INTEGER NOT NULL,
        action_type VARCHAR(255),
        status VARCHAR(32) NOT NULL DEFAULT 'WAITING',
        nominal_time TIMESTAMPTZ NOT NULL,
        created_time TIMESTAMPTZ NOT NULL,
        last_modified_time TIMESTAMPTZ NOT NULL,
        external_id VARCHAR(255),
        external_status VARCHAR(255),
        tracker_uri TEXT,
        console_url TEXT,
        missing_dependencies TEXT,
        timeout INTEGER NOT NULL DEFAULT -1,
        action_xml TEXT,
        created_conf TEXT,
        run_conf TEXT,
        sla_xml TEXT,
        pending INTEGER NOT NULL DEFAULT 0,
        error_code VARCHAR(255),
        error_message TEXT,
        push_missing_dependencies TEXT,
        rerun_time TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_coord_actions_job_nominal ON coord_actions (job_id, nominal_time)",
];
