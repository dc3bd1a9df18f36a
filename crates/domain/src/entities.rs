use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use coordinator_errors::CoordError;
use serde::{Deserialize, Serialize};

/// 协调器动作状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoordinatorActionStatus {
    Waiting,
    Ready,
    Submitted,
    Running,
    Suspended,
    Timedout,
    Succeeded,
    Killed,
    Failed,
    Ignored,
    Skipped,
}

impl CoordinatorActionStatus {
    pub const ALL: [CoordinatorActionStatus; 11] = [
        CoordinatorActionStatus::Waiting,
        CoordinatorActionStatus::Ready,
        CoordinatorActionStatus::Submitted,
        CoordinatorActionStatus::Running,
        CoordinatorActionStatus::Suspended,
        CoordinatorActionStatus::Timedout,
        CoordinatorActionStatus::Succeeded,
        CoordinatorActionStatus::Killed,
        CoordinatorActionStatus::Failed,
        CoordinatorActionStatus::Ignored,
        CoordinatorActionStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorActionStatus::Waiting => "WAITING",
            CoordinatorActionStatus::Ready => "READY",
            CoordinatorActionStatus::Submitted => "SUBMITTED",
            CoordinatorActionStatus::Running => "RUNNING",
            CoordinatorActionStatus::Suspended => "SUSPENDED",
            CoordinatorActionStatus::Timedout => "TIMEDOUT",
            CoordinatorActionStatus::Succeeded => "SUCCEEDED",
            CoordinatorActionStatus::Killed => "KILLED",
            CoordinatorActionStatus::Failed => "FAILED",
            CoordinatorActionStatus::Ignored => "IGNORED",
            CoordinatorActionStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for CoordinatorActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinatorActionStatus {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoordError::invalid_status_filter(format!("未知的协调器动作状态: '{s}'")))
    }
}

/// 持久化的协调器动作记录
///
/// 由协调器引擎在物化动作时创建，并随状态迁移原地更新。
/// 查询组件只读取它，对外只返回 [`CoordinatorActionView`] 投影。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorAction {
    pub id: String,
    pub job_id: String,
    pub action_number: i32,
    pub action_type: Option<String>,
    pub status: CoordinatorActionStatus,
    pub nominal_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
    pub external_id: Option<String>,
    pub external_status: Option<String>,
    pub tracker_uri: Option<String>,
    pub console_url: Option<String>,
    pub missing_dependencies: Option<String>,
    /// Timeout in minutes, negative means no timeout
    pub timeout: i32,
    pub action_xml: Option<String>,
    pub created_conf: Option<String>,
    pub run_conf: Option<String>,
    pub sla_xml: Option<String>,
    pub pending: i32,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub push_missing_dependencies: Option<String>,
    pub rerun_time: Option<DateTime<Utc>>,
}

impl CoordinatorAction {
    /// Action ids are `<job id>@<action number>`
    pub fn new(job_id: &str, action_number: i32, nominal_time: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{job_id}@{action_number}"),
            job_id: job_id.to_string(),
            action_number,
            action_type: None,
            status: CoordinatorActionStatus::Waiting,
            nominal_time,
            created_time: now,
            last_modified_time: now,
            external_id: None,
            external_status: None,
            tracker_uri: None,
            console_url: None,
            missing_dependencies: None,
            timeout: -1,
            action_xml: None,
            created_conf: None,
            run_conf: None,
            sla_xml: None,
            pending: 0,
            error_code: None,
            error_message: None,
            push_missing_dependencies: None,
            rerun_time: None,
        }
    }

    pub fn with_status(mut self, status: CoordinatorActionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn entity_description(&self) -> String {
        format!(
            "协调器动作 '{}' (作业: {}, 序号: {})",
            self.id, self.job_id, self.action_number
        )
    }
}

/// Fields of [`CoordinatorAction`] copied into [`CoordinatorActionView`].
pub const PROJECTED_FIELDS: [&str; 18] = [
    "id",
    "job_id",
    "action_number",
    "action_type",
    "status",
    "nominal_time",
    "created_time",
    "last_modified_time",
    "external_id",
    "external_status",
    "tracker_uri",
    "console_url",
    "missing_dependencies",
    "timeout",
    "action_xml",
    "created_conf",
    "run_conf",
    "sla_xml",
];

/// Engine-internal fields of [`CoordinatorAction`] that never leave the store.
pub const WITHHELD_FIELDS: [&str; 5] = [
    "pending",
    "error_code",
    "error_message",
    "push_missing_dependencies",
    "rerun_time",
];

/// 协调器动作的只读快照，只包含允许对外暴露的字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorActionView {
    pub id: String,
    pub job_id: String,
    pub action_number: i32,
    pub action_type: Option<String>,
    pub status: CoordinatorActionStatus,
    pub nominal_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
    pub external_id: Option<String>,
    pub external_status: Option<String>,
    pub tracker_uri: Option<String>,
    pub console_url: Option<String>,
    pub missing_dependencies: Option<String>,
    pub timeout: i32,
    pub action_xml: Option<String>,
    pub created_conf: Option<String>,
    pub run_conf: Option<String>,
    pub sla_xml: Option<String>,
}

impl From<&CoordinatorAction> for CoordinatorActionView {
    fn from(action: &CoordinatorAction) -> Self {
        // No `..` here: a new record field must be classified before this compiles.
        let CoordinatorAction {
            id,
            job_id,
            action_number,
            action_type,
            status,
            nominal_time,
            created_time,
            last_modified_time,
            external_id,
            external_status,
            tracker_uri,
            console_url,
            missing_dependencies,
            timeout,
            action_xml,
            created_conf,
            run_conf,
            sla_xml,
            pending: _,
            error_code: _,
            error_message: _,
            push_missing_dependencies: _,
            rerun_time: _,
        } = action;

        Self {
            id: id.clone(),
            job_id: job_id.clone(),
            action_number: *action_number,
            action_type: action_type.clone(),
            status: *status,
            nominal_time: *nominal_time,
            created_time: *created_time,
            last_modified_time: *last_modified_time,
            external_id: external_id.clone(),
            external_status: external_status.clone(),
            tracker_uri: tracker_uri.clone(),
            console_url: console_url.clone(),
            missing_dependencies: missing_dependencies.clone(),
            timeout: *timeout,
            action_xml: action_xml.clone(),
            created_conf: created_conf.clone(),
            run_conf: run_conf.clone(),
            sla_xml: sla_xml.clone(),
        }
    }
}

impl From<CoordinatorAction> for CoordinatorActionView {
    fn from(action: CoordinatorAction) -> Self {
        Self::from(&action)
    }
}
