use coordinator_errors::{CoordError, CoordResult};
use serde::{Deserialize, Serialize};

use crate::entities::CoordinatorActionStatus;

/// Default page length of an action subset query
pub const DEFAULT_WINDOW_LEN: u32 = 50;

/// A set of statuses restricting an action query, in the order first given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFilter {
    statuses: Vec<CoordinatorActionStatus>,
}

impl StatusFilter {
    /// Filter that matches every status
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse caller-supplied status names against the closed status set.
    ///
    /// Duplicates collapse to their first occurrence. An unknown or blank
    /// value rejects the whole filter.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> CoordResult<Self> {
        let mut filter = Self::default();
        for value in values {
            let raw = value.as_ref();
            if raw.trim().is_empty() {
                return Err(CoordError::invalid_status_filter("状态过滤值不能为空"));
            }
            filter.insert(raw.parse()?);
        }
        Ok(filter)
    }

    fn insert(&mut self, status: CoordinatorActionStatus) {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn statuses(&self) -> &[CoordinatorActionStatus] {
        &self.statuses
    }
}

/// 1-based pagination window: rows `start ..= start + len - 1` of the ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionWindow {
    start: u32,
    len: u32,
}

impl ActionWindow {
    pub fn new(start: u32, len: u32) -> CoordResult<Self> {
        if start == 0 {
            return Err(CoordError::invalid_pagination(
                "起始位置从1开始计数，start必须大于等于1",
            ));
        }
        Ok(Self { start, len })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rows skipped before the window
    pub fn offset(&self) -> i64 {
        i64::from(self.start) - 1
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.len)
    }
}

impl Default for ActionWindow {
    fn default() -> Self {
        Self {
            start: 1,
            len: DEFAULT_WINDOW_LEN,
        }
    }
}
