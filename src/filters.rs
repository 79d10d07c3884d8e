use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Sentinel user id meaning "no user constraint". A real, always-sent
/// value, not an absent field.
pub const ALL_USERS: &str = "all";

/// Sentinel Jira status meaning "no status constraint".
pub const ALL_STATUSES: &str = "All Statuses";

/// An optional creation-date window. Each bound serializes
/// independently; an unset bound is omitted from the query entirely,
/// never sent empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_unset(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    fn push_query(&self, query: &mut Vec<(String, String)>) {
        if let Some(start) = self.start {
            query.push(("startDate".to_string(), format_timestamp(start)));
        }
        if let Some(end) = self.end {
            query.push(("endDate".to_string(), format_timestamp(end)));
        }
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a timestamp as RFC 3339, or as a bare `YYYY-MM-DD` taken as
/// midnight UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| Error::Input(format!("invalid date: {input} (expected YYYY-MM-DD)")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Input(format!("invalid date: {input}")))?;
    Ok(midnight.and_utc())
}

/// Task completion filter. `all` is the default and is always sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    All,
    Completed,
    Pending,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::All => "all",
            TaskStatus::Completed => "completed",
            TaskStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(TaskStatus::All),
            "completed" => Ok(TaskStatus::Completed),
            "pending" => Ok(TaskStatus::Pending),
            other => Err(Error::Input(format!(
                "unknown status: {other} (expected: all, completed, pending)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: TaskStatus,
    pub range: DateRange,
}

impl TaskFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("status".to_string(), self.status.as_str().to_string())];
        self.range.push_query(&mut query);
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraFilter {
    pub user: String,
    pub status: String,
    pub range: DateRange,
}

impl Default for JiraFilter {
    fn default() -> Self {
        Self {
            user: ALL_USERS.to_string(),
            status: ALL_STATUSES.to_string(),
            range: DateRange::default(),
        }
    }
}

impl JiraFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("username".to_string(), self.user.clone()),
            ("status".to_string(), self.status.clone()),
        ];
        self.range.push_query(&mut query);
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitbucketFilter {
    pub user: String,
    pub range: DateRange,
}

impl Default for BitbucketFilter {
    fn default() -> Self {
        Self {
            user: ALL_USERS.to_string(),
            range: DateRange::default(),
        }
    }
}

impl BitbucketFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("username".to_string(), self.user.clone())];
        self.range.push_query(&mut query);
        query
    }
}
