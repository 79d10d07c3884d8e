use serde::Deserialize;
use tracing::debug;

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};
use crate::filters::JiraFilter;

/// A Jira issue as the service relays it: the raw tracker envelope with
/// the interesting bits under `fields`. Read-only; never mutated
/// locally.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssueFields {
    pub summary: String,
    pub status: IssueStatus,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<IssueType>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssueStatus {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssueType {
    pub name: String,
}

/// An assignable user, for the user filter dropdown.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JiraUser {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// A workflow status name, for the status filter dropdown.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JiraStatus {
    pub id: String,
    pub name: String,
}

pub fn fetch(client: &dyn ApiTransport, filter: &JiraFilter) -> Result<Vec<Issue>> {
    let value = client.request(Method::Get, "/jira_issues", &filter.query(), None)?;
    let issues: Vec<Issue> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse Jira issues: {e}")))?;
    debug!(count = issues.len(), "fetched Jira issues");
    Ok(issues)
}

/// Assignable users. Lookup lists degrade quietly: the caller treats a
/// failure as an empty list, no alert.
pub fn fetch_users(client: &dyn ApiTransport) -> Result<Vec<JiraUser>> {
    let value = client.request(Method::Get, "/jira_users", &[], None)?;
    let users: Vec<JiraUser> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse Jira users: {e}")))?;
    debug!(count = users.len(), "fetched Jira users");
    Ok(users)
}

pub fn fetch_statuses(client: &dyn ApiTransport) -> Result<Vec<JiraStatus>> {
    let value = client.request(Method::Get, "/jira_statuses", &[], None)?;
    let statuses: Vec<JiraStatus> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse Jira statuses: {e}")))?;
    debug!(count = statuses.len(), "fetched Jira statuses");
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, parse_timestamp};
    use crate::test_helpers::{MockTransport, issue_json};
    use serde_json::json;

    #[test]
    fn test_fetch_parses_nested_fields() {
        let client = MockTransport::new(vec![Ok(json!([
            issue_json("OPS-1", "Fix login", "In Progress"),
            issue_json("OPS-2", "Upgrade runtime", "Done"),
        ]))]);
        let issues = fetch(&client, &JiraFilter::default()).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].key, "OPS-1");
        assert_eq!(issues[0].fields.summary, "Fix login");
        assert_eq!(issues[0].fields.status.name, "In Progress");
    }

    #[test]
    fn test_fetch_sends_filter_query() {
        let client = MockTransport::new(vec![Ok(json!([]))]);
        let filter = JiraFilter {
            user: "acct-7".to_string(),
            status: "Done".to_string(),
            range: DateRange::new(
                Some(parse_timestamp("2024-02-01").unwrap()),
                Some(parse_timestamp("2024-02-29").unwrap()),
            ),
        };
        fetch(&client, &filter).unwrap();

        let call = &client.calls()[0];
        assert_eq!(call.path, "/jira_issues");
        assert_eq!(call.query_value("username"), Some("acct-7"));
        assert_eq!(call.query_value("status"), Some("Done"));
        assert_eq!(call.query_value("startDate"), Some("2024-02-01T00:00:00Z"));
        assert_eq!(call.query_value("endDate"), Some("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn test_fetch_handles_missing_issuetype() {
        let client = MockTransport::new(vec![Ok(json!([{
            "id": "10", "key": "OPS-3",
            "fields": { "summary": "Bare issue", "status": { "name": "To Do" } }
        }]))]);
        let issues = fetch(&client, &JiraFilter::default()).unwrap();
        assert!(issues[0].fields.issue_type.is_none());
    }

    #[test]
    fn test_fetch_error_propagated() {
        let client = MockTransport::new(vec![Err(Error::Server {
            status: 400,
            message: "Jira credentials not configured.".to_string(),
        })]);
        let err = fetch(&client, &JiraFilter::default()).unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_fetch_users() {
        let client = MockTransport::new(vec![Ok(json!([
            { "displayName": "Ana", "accountId": "a-1" },
            { "displayName": "Bo", "accountId": "a-2" },
        ]))]);
        let users = fetch_users(&client).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].display_name, "Ana");
        assert_eq!(users[1].account_id, "a-2");
    }

    #[test]
    fn test_fetch_statuses() {
        let client = MockTransport::new(vec![Ok(json!([
            { "id": "1", "name": "To Do" },
            { "id": "3", "name": "Done" },
        ]))]);
        let statuses = fetch_statuses(&client).unwrap();
        assert_eq!(statuses[1].name, "Done");
    }
}
