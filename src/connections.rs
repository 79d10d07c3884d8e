use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};

/// Stored third-party credential metadata as the service reports it.
/// Secrets are never echoed back; only the configured flags and the
/// non-secret identifiers come over the wire.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ConnectionSettings {
    #[serde(default)]
    pub jira_configured: bool,
    #[serde(default)]
    pub jira_user: String,
    #[serde(default)]
    pub jira_url: String,
    #[serde(default)]
    pub jira_project: String,
    #[serde(default)]
    pub bitbucket_configured: bool,
    #[serde(default)]
    pub bitbucket_user: String,
    #[serde(default)]
    pub bitbucket_workspace: String,
    #[serde(default)]
    pub bitbucket_repo: String,
}

/// Partial credential update. Token fields are write-only: they are
/// serialized only when set, so an update never blanks a stored secret.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConnectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket_workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket_pass: Option<String>,
}

impl ConnectionUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ConnectionUpdate::default()
    }
}

pub fn fetch(client: &dyn ApiTransport) -> Result<ConnectionSettings> {
    let value = client.request(Method::Get, "/api/authorizations", &[], None)?;
    serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse connection settings: {e}")))
}

pub fn save(client: &dyn ApiTransport, update: &ConnectionUpdate) -> Result<()> {
    let body = serde_json::to_value(update)
        .map_err(|e| Error::Decode(format!("failed to serialize connection update: {e}")))?;
    client.request(Method::Post, "/api/authorizations", &[], Some(body))?;
    info!("saved connection credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockTransport;
    use serde_json::json;

    #[test]
    fn test_fetch_parses_settings() {
        let client = MockTransport::new(vec![Ok(json!({
            "jira_configured": true,
            "jira_user": "ana@example.com",
            "jira_url": "https://example.atlassian.net",
            "jira_project": "OPS",
            "bitbucket_configured": false,
            "bitbucket_user": "",
            "bitbucket_workspace": "",
            "bitbucket_repo": ""
        }))]);
        let settings = fetch(&client).unwrap();
        assert!(settings.jira_configured);
        assert!(!settings.bitbucket_configured);
        assert_eq!(settings.jira_project, "OPS");
    }

    #[test]
    fn test_save_omits_unset_secrets() {
        let client = MockTransport::new(vec![Ok(json!({ "message": "saved" }))]);
        let update = ConnectionUpdate {
            jira_user: Some("ana@example.com".to_string()),
            jira_project: Some("OPS".to_string()),
            ..Default::default()
        };
        save(&client, &update).unwrap();

        let body = client.calls()[0].body.clone().unwrap();
        assert_eq!(body.get("jira_user"), Some(&json!("ana@example.com")));
        assert!(body.get("jira_token").is_none());
        assert!(body.get("bitbucket_pass").is_none());
    }

    #[test]
    fn test_save_sends_secret_when_set() {
        let client = MockTransport::new(vec![Ok(json!({ "message": "saved" }))]);
        let update = ConnectionUpdate {
            jira_token: Some("secret".to_string()),
            ..Default::default()
        };
        save(&client, &update).unwrap();

        let body = client.calls()[0].body.clone().unwrap();
        assert_eq!(body.get("jira_token"), Some(&json!("secret")));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ConnectionUpdate::default().is_empty());
        let update = ConnectionUpdate {
            jira_url: Some("example.atlassian.net".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
