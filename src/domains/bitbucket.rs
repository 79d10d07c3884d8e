use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};
use crate::filters::BitbucketFilter;

/// A Bitbucket commit projection. Read-only; replaced wholesale on
/// every fetch.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CommitAuthor {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub user: Option<AccountRef>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountRef {
    pub display_name: String,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl Commit {
    /// Abbreviated hash used everywhere a commit is shown on one line.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.user.as_ref())
            .map(|u| u.display_name.as_str())
            .unwrap_or("N/A")
    }
}

/// A workspace member, for the user filter dropdown.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Member {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl Member {
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.nickname.as_deref())
            .unwrap_or("N/A")
    }
}

pub fn fetch(client: &dyn ApiTransport, filter: &BitbucketFilter) -> Result<Vec<Commit>> {
    let value = client.request(Method::Get, "/bitbucket_commits", &filter.query(), None)?;
    let commits: Vec<Commit> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse Bitbucket commits: {e}")))?;
    debug!(count = commits.len(), "fetched Bitbucket commits");
    Ok(commits)
}

/// Workspace members. Degrades to empty on failure at the call site, no
/// alert.
pub fn fetch_members(client: &dyn ApiTransport) -> Result<Vec<Member>> {
    let value = client.request(Method::Get, "/bitbucket_users", &[], None)?;
    let members: Vec<Member> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse Bitbucket members: {e}")))?;
    debug!(count = members.len(), "fetched Bitbucket members");
    Ok(members)
}
