use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use crate::api::ApiTransport;
use crate::domains::bitbucket::{self, Commit};
use crate::domains::jira::{self, Issue};
use crate::domains::tasks::{self, Task};
use crate::domains::Domain;
use crate::error::Result;
use crate::filters::{BitbucketFilter, DateRange, JiraFilter, TaskFilter, TaskStatus};
use crate::summary::{self, SUMMARY_FORMAT};

/// The active view. Exactly one is composed at a time; it decides which
/// filters apply and which collections are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Todo,
    Atlassian,
    Connections,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Todo => "To-Do List",
            View::Atlassian => "Atlassian Dashboard",
            View::Connections => "Manage Connections",
        }
    }

    /// The domains this view composes.
    pub fn domains(&self) -> &'static [Domain] {
        match self {
            View::Todo => &[Domain::Tasks],
            View::Atlassian => &[Domain::Jira, Domain::Bitbucket],
            View::Connections => &[],
        }
    }
}

/// Which collection summarize targets inside the Atlassian view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AtlassianTab {
    #[default]
    Jira,
    Bitbucket,
}

/// A user-visible fetch failure. Mutation failures never produce one.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub domain: Domain,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Error: {}", self.domain.label(), self.message)
    }
}

/// Monotonic per-domain fetch sequencing. A response is applied only if
/// it is newer than the last applied one, so a slow stale fetch can
/// never overwrite fresher data.
#[derive(Debug, Clone, Copy, Default)]
struct FetchGuard {
    issued: u64,
    applied: u64,
}

impl FetchGuard {
    fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn admit(&mut self, seq: u64) -> bool {
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }
}

/// Client-side state of the dashboard: active view, per-view filters,
/// the three cached collections, and the current summary.
///
/// Filter and view mutations never fetch directly; they enqueue refresh
/// events for the affected domains, and `sync` drains the queue. Each
/// domain fails independently.
pub struct Dashboard {
    view: View,
    tab: AtlassianTab,
    tasks: Vec<Task>,
    issues: Vec<Issue>,
    commits: Vec<Commit>,
    summary: String,
    task_status: TaskStatus,
    jira_user: String,
    jira_status: String,
    bitbucket_user: String,
    range: DateRange,
    summary_format: String,
    queue: VecDeque<Domain>,
    task_guard: FetchGuard,
    jira_guard: FetchGuard,
    bitbucket_guard: FetchGuard,
}

impl Dashboard {
    pub fn new() -> Self {
        let jira = JiraFilter::default();
        let bitbucket = BitbucketFilter::default();
        let mut dashboard = Self {
            view: View::Todo,
            tab: AtlassianTab::default(),
            tasks: Vec::new(),
            issues: Vec::new(),
            commits: Vec::new(),
            summary: String::new(),
            task_status: TaskStatus::default(),
            jira_user: jira.user,
            jira_status: jira.status,
            bitbucket_user: bitbucket.user,
            range: DateRange::default(),
            summary_format: SUMMARY_FORMAT.to_string(),
            queue: VecDeque::new(),
            task_guard: FetchGuard::default(),
            jira_guard: FetchGuard::default(),
            bitbucket_guard: FetchGuard::default(),
        };
        // First composition of the initial view.
        dashboard.enqueue(Domain::Tasks);
        dashboard
    }

    /// A dashboard whose summarize calls use a custom formatting
    /// directive instead of the default.
    pub fn with_summary_format(format: impl Into<String>) -> Self {
        let mut dashboard = Self::new();
        dashboard.summary_format = format.into();
        dashboard
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tab(&self) -> AtlassianTab {
        self.tab
    }

    pub fn title(&self) -> &'static str {
        self.view.title()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn pending(&self) -> impl Iterator<Item = Domain> + '_ {
        self.queue.iter().copied()
    }

    pub fn task_filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.task_status,
            range: self.range,
        }
    }

    pub fn jira_filter(&self) -> JiraFilter {
        JiraFilter {
            user: self.jira_user.clone(),
            status: self.jira_status.clone(),
            range: self.range,
        }
    }

    pub fn bitbucket_filter(&self) -> BitbucketFilter {
        BitbucketFilter {
            user: self.bitbucket_user.clone(),
            range: self.range,
        }
    }

    fn enqueue(&mut self, domain: Domain) {
        if !self.queue.contains(&domain) {
            self.queue.push_back(domain);
        }
    }

    /// Enqueue a refresh if the domain is composed by the active view.
    fn refresh_if_visible(&mut self, domain: Domain) {
        if self.view.domains().contains(&domain) {
            self.enqueue(domain);
        }
    }

    /// Switch the active view. Entering the Atlassian view clears the
    /// summary so a stale one is never shown against new data.
    pub fn switch_view(&mut self, view: View) {
        if view == self.view {
            return;
        }
        self.view = view;
        if view == View::Atlassian {
            self.summary.clear();
        }
        for domain in view.domains() {
            self.enqueue(*domain);
        }
    }

    pub fn set_tab(&mut self, tab: AtlassianTab) {
        self.tab = tab;
    }

    pub fn set_task_status(&mut self, status: TaskStatus) {
        if self.task_status != status {
            self.task_status = status;
            self.refresh_if_visible(Domain::Tasks);
        }
    }

    pub fn set_jira_user(&mut self, user: String) {
        if self.jira_user != user {
            self.jira_user = user;
            self.refresh_if_visible(Domain::Jira);
        }
    }

    pub fn set_jira_status(&mut self, status: String) {
        if self.jira_status != status {
            self.jira_status = status;
            self.refresh_if_visible(Domain::Jira);
        }
    }

    pub fn set_bitbucket_user(&mut self, user: String) {
        if self.bitbucket_user != user {
            self.bitbucket_user = user;
            self.refresh_if_visible(Domain::Bitbucket);
        }
    }

    /// The date range is shared: it is relevant to every domain, so a
    /// change refreshes whichever domains the active view composes.
    pub fn set_date_range(&mut self, range: DateRange) {
        if self.range != range {
            self.range = range;
            self.refresh_if_visible(Domain::Tasks);
            self.refresh_if_visible(Domain::Jira);
            self.refresh_if_visible(Domain::Bitbucket);
        }
    }

    /// Start a fetch for a domain, reserving its sequence slot.
    pub fn begin_fetch(&mut self, domain: Domain) -> u64 {
        match domain {
            Domain::Tasks => self.task_guard.begin(),
            Domain::Jira => self.jira_guard.begin(),
            Domain::Bitbucket => self.bitbucket_guard.begin(),
        }
    }

    /// Apply a completed tasks fetch. A stale response (older than the
    /// last applied) is discarded. Success replaces the collection
    /// wholesale; failure empties it and raises an alert.
    pub fn apply_tasks(&mut self, seq: u64, result: Result<Vec<Task>>) -> Option<Alert> {
        if !self.task_guard.admit(seq) {
            debug!(seq, "discarding stale tasks response");
            return None;
        }
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch tasks");
                self.tasks.clear();
                Some(Alert {
                    domain: Domain::Tasks,
                    message: e.user_message(Domain::Tasks.fetch_fallback()),
                })
            }
        }
    }

    pub fn apply_issues(&mut self, seq: u64, result: Result<Vec<Issue>>) -> Option<Alert> {
        if !self.jira_guard.admit(seq) {
            debug!(seq, "discarding stale Jira response");
            return None;
        }
        match result {
            Ok(issues) => {
                self.issues = issues;
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch Jira issues");
                self.issues.clear();
                Some(Alert {
                    domain: Domain::Jira,
                    message: e.user_message(Domain::Jira.fetch_fallback()),
                })
            }
        }
    }

    pub fn apply_commits(&mut self, seq: u64, result: Result<Vec<Commit>>) -> Option<Alert> {
        if !self.bitbucket_guard.admit(seq) {
            debug!(seq, "discarding stale Bitbucket response");
            return None;
        }
        match result {
            Ok(commits) => {
                self.commits = commits;
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch Bitbucket commits");
                self.commits.clear();
                Some(Alert {
                    domain: Domain::Bitbucket,
                    message: e.user_message(Domain::Bitbucket.fetch_fallback()),
                })
            }
        }
    }

    /// Drain the refresh queue, fetching each enqueued domain under its
    /// current filter. Domains fail independently; the returned alerts
    /// are whatever the user must be told.
    pub fn sync(&mut self, client: &dyn ApiTransport) -> Vec<Alert> {
        let mut alerts = Vec::new();
        while let Some(domain) = self.queue.pop_front() {
            let seq = self.begin_fetch(domain);
            let alert = match domain {
                Domain::Tasks => {
                    let result = tasks::fetch(client, &self.task_filter());
                    self.apply_tasks(seq, result)
                }
                Domain::Jira => {
                    let result = jira::fetch(client, &self.jira_filter());
                    self.apply_issues(seq, result)
                }
                Domain::Bitbucket => {
                    let result = bitbucket::fetch(client, &self.bitbucket_filter());
                    self.apply_commits(seq, result)
                }
            };
            alerts.extend(alert);
        }
        alerts
    }

    /// Create a task. The server assigns its identity, so on success
    /// the collection is re-fetched under the current filter rather
    /// than patched locally. Failure is logged only.
    pub fn add_task(&mut self, client: &dyn ApiTransport, text: &str) {
        match tasks::create(client, text) {
            Ok(task) => {
                debug!(id = %task.id, "task created, re-fetching");
                self.enqueue(Domain::Tasks);
            }
            Err(e) => warn!(error = %e, "failed to add task"),
        }
    }

    /// Delete by identity. On success the matching item is removed
    /// locally, no re-fetch. Deleting an id that is not present leaves
    /// the collection unchanged.
    pub fn delete_task(&mut self, client: &dyn ApiTransport, id: &str) {
        match tasks::delete(client, id) {
            Ok(()) => self.tasks.retain(|t| t.id != id),
            Err(e) => warn!(error = %e, id, "failed to delete task"),
        }
    }

    /// Flip completion by identity. On success exactly the matching
    /// item's flag flips locally, no re-fetch.
    pub fn toggle_task(&mut self, client: &dyn ApiTransport, id: &str) {
        match tasks::toggle_complete(client, id) {
            Ok(()) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = !task.completed;
                }
            }
            Err(e) => warn!(error = %e, id, "failed to toggle task"),
        }
    }

    /// Summarize whatever collection the active view shows. The result
    /// replaces the previous summary wholesale.
    pub fn summarize_current(&mut self, client: &dyn ApiTransport) {
        let text = match (self.view, self.tab) {
            (View::Todo, _) => summary::task_lines(&self.tasks),
            (View::Atlassian, AtlassianTab::Jira) => summary::issue_lines(&self.issues),
            (View::Atlassian, AtlassianTab::Bitbucket) => summary::commit_lines(&self.commits),
            (View::Connections, _) => {
                debug!("nothing to summarize on the connections view");
                return;
            }
        };
        self.summary = summary::summarize_or_failure(client, &text, &self.summary_format);
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
