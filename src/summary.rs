use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::api::{ApiTransport, Method};
use crate::domains::bitbucket::Commit;
use crate::domains::jira::Issue;
use crate::domains::tasks::Task;
use crate::error::{Error, Result};

/// Formatting directive sent with every summarization request.
pub const SUMMARY_FORMAT: &str = "concise bullet points";

/// Fixed text shown when summarization fails. Never empty, never stale.
pub const SUMMARY_FAILURE: &str = "Failed to generate summary.";

/// One line per task: the text alone.
pub fn task_lines(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per issue: `KEY: summary`.
pub fn issue_lines(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.key, i.fields.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per commit: `shorthash: message`.
pub fn commit_lines(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(|c| format!("{}: {}", c.short_hash(), c.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

/// Submit a text block for summarization. An empty block is still
/// submitted; the server decides what to do with it.
pub fn summarize(client: &dyn ApiTransport, text: &str, format: &str) -> Result<String> {
    let value = client.request(
        Method::Post,
        "/summarize",
        &[],
        Some(json!({ "text": text, "format": format })),
    )?;
    let response: SummarizeResponse = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse summary response: {e}")))?;
    Ok(response.summary)
}

/// The full workflow: the result always replaces the previous summary,
/// a failure with the fixed placeholder rather than silence.
pub fn summarize_or_failure(client: &dyn ApiTransport, text: &str, format: &str) -> String {
    match summarize(client, text, format) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "summarization failed");
            SUMMARY_FAILURE.to_string()
        }
    }
}
