use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use crate::api::{ApiTransport, HttpTransport};
use crate::auth;
use crate::cli::{Cli, CliCommand, ConnectionsCommand, TasksCommand};
use crate::config::Config;
use crate::connections::{self, ConnectionUpdate};
use crate::dashboard::Dashboard;
use crate::domains::{bitbucket, jira, tasks};
use crate::error::{Error, Result};
use crate::filters::{
    ALL_STATUSES, ALL_USERS, BitbucketFilter, DateRange, JiraFilter, TaskFilter, TaskStatus,
    parse_timestamp,
};
use crate::session::SessionStore;
use crate::shell;
use crate::summary;

/// What a one-shot `summarize` invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummarizeTarget {
    Tasks,
    Jira,
    Commits,
}

impl FromStr for SummarizeTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tasks" => Ok(SummarizeTarget::Tasks),
            "jira" => Ok(SummarizeTarget::Jira),
            "commits" => Ok(SummarizeTarget::Commits),
            other => Err(Error::Input(format!(
                "unknown summarize target: {other} (expected: tasks, jira, commits)"
            ))),
        }
    }
}

fn session_dir(config: &Config) -> PathBuf {
    config
        .session_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(SessionStore::default_dir)
}

fn parse_range(from: &Option<String>, to: &Option<String>) -> Result<DateRange> {
    let start = from.as_deref().map(parse_timestamp).transpose()?;
    let end = to.as_deref().map(parse_timestamp).transpose()?;
    Ok(DateRange::new(start, end))
}

fn jira_filter(
    user: &Option<String>,
    status: &Option<String>,
    from: &Option<String>,
    to: &Option<String>,
) -> Result<JiraFilter> {
    Ok(JiraFilter {
        user: user.clone().unwrap_or_else(|| ALL_USERS.to_string()),
        status: status.clone().unwrap_or_else(|| ALL_STATUSES.to_string()),
        range: parse_range(from, to)?,
    })
}

fn bitbucket_filter(
    user: &Option<String>,
    from: &Option<String>,
    to: &Option<String>,
) -> Result<BitbucketFilter> {
    Ok(BitbucketFilter {
        user: user.clone().unwrap_or_else(|| ALL_USERS.to_string()),
        range: parse_range(from, to)?,
    })
}

fn task_filter(
    status: &Option<String>,
    from: &Option<String>,
    to: &Option<String>,
) -> Result<TaskFilter> {
    Ok(TaskFilter {
        status: match status {
            Some(s) => s.parse()?,
            None => TaskStatus::default(),
        },
        range: parse_range(from, to)?,
    })
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli)?;
    let store = SessionStore::new(session_dir(&config));
    let client = HttpTransport::new(&config.api_url, store.load().as_ref());

    match &cli.command {
        CliCommand::Login { email, password } => {
            let anonymous = HttpTransport::new(&config.api_url, None);
            let session = auth::login(&anonymous, email, password)?;
            store.save(&session)?;
            println!("Logged in as {}", session.email);
            Ok(())
        }
        CliCommand::Signup { email, password } => {
            let anonymous = HttpTransport::new(&config.api_url, None);
            let message = auth::signup(&anonymous, email, password)?;
            println!("{message}");
            Ok(())
        }
        CliCommand::Logout => {
            store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        CliCommand::Board => {
            let mut dashboard = Dashboard::with_summary_format(config.summary_format.clone());
            let stdin = io::stdin();
            let stdout = io::stdout();
            shell::run(
                &mut dashboard,
                &client,
                &mut stdin.lock(),
                &mut stdout.lock(),
            )
        }
        CliCommand::Tasks { command } => run_tasks(&client, command),
        CliCommand::Jira {
            user,
            status,
            from,
            to,
        } => {
            let issues = jira::fetch(&client, &jira_filter(user, status, from, to)?)?;
            if issues.is_empty() {
                println!("No Jira issues found. Check your connections or adjust your filters.");
            }
            for issue in &issues {
                println!(
                    "{}: {} [{}]",
                    issue.key, issue.fields.summary, issue.fields.status.name
                );
            }
            Ok(())
        }
        CliCommand::Commits { user, from, to } => {
            let commits = bitbucket::fetch(&client, &bitbucket_filter(user, from, to)?)?;
            if commits.is_empty() {
                println!("No Bitbucket commits found. Check your connections.");
            }
            for commit in &commits {
                println!(
                    "{}: {} ({})",
                    commit.short_hash(),
                    commit.message,
                    commit.author_name()
                );
            }
            Ok(())
        }
        CliCommand::Connections { command } => run_connections(&client, command),
        CliCommand::Summarize {
            target,
            user,
            status,
            from,
            to,
        } => {
            let text = match target.parse::<SummarizeTarget>()? {
                SummarizeTarget::Tasks => {
                    let tasks = tasks::fetch(&client, &task_filter(status, from, to)?)?;
                    summary::task_lines(&tasks)
                }
                SummarizeTarget::Jira => {
                    let issues = jira::fetch(&client, &jira_filter(user, status, from, to)?)?;
                    summary::issue_lines(&issues)
                }
                SummarizeTarget::Commits => {
                    let commits = bitbucket::fetch(&client, &bitbucket_filter(user, from, to)?)?;
                    summary::commit_lines(&commits)
                }
            };
            println!(
                "{}",
                summary::summarize_or_failure(&client, &text, &config.summary_format)
            );
            Ok(())
        }
    }
}

fn run_tasks(client: &dyn ApiTransport, command: &TasksCommand) -> Result<()> {
    match command {
        TasksCommand::List { status, from, to } => {
            let tasks = tasks::fetch(client, &task_filter(status, from, to)?)?;
            if tasks.is_empty() {
                println!("No tasks yet.");
            }
            for task in &tasks {
                let mark = if task.completed { "x" } else { " " };
                println!("[{mark}] {}  {}", task.id, task.text);
            }
            Ok(())
        }
        TasksCommand::Add { text } => {
            let task = tasks::create(client, text)?;
            println!("Added task {}", task.id);
            Ok(())
        }
        TasksCommand::Done { id } => {
            tasks::toggle_complete(client, id)?;
            println!("Toggled task {id}");
            Ok(())
        }
        TasksCommand::Rm { id } => {
            tasks::delete(client, id)?;
            println!("Deleted task {id}");
            Ok(())
        }
    }
}

fn run_connections(client: &dyn ApiTransport, command: &ConnectionsCommand) -> Result<()> {
    match command {
        ConnectionsCommand::Show => {
            let settings = connections::fetch(client)?;
            if settings.jira_configured {
                println!(
                    "Jira: configured ({}, {}, {})",
                    settings.jira_user, settings.jira_url, settings.jira_project
                );
            } else {
                println!("Jira: not configured");
            }
            if settings.bitbucket_configured {
                println!(
                    "Bitbucket: configured ({}, {}/{})",
                    settings.bitbucket_user, settings.bitbucket_workspace, settings.bitbucket_repo
                );
            } else {
                println!("Bitbucket: not configured");
            }
            Ok(())
        }
        ConnectionsCommand::Set {
            jira_user,
            jira_url,
            jira_project,
            jira_token,
            bitbucket_user,
            bitbucket_workspace,
            bitbucket_repo,
            bitbucket_pass,
        } => {
            let update = ConnectionUpdate {
                jira_user: jira_user.clone(),
                jira_url: jira_url.clone(),
                jira_project: jira_project.clone(),
                jira_token: jira_token.clone(),
                bitbucket_user: bitbucket_user.clone(),
                bitbucket_workspace: bitbucket_workspace.clone(),
                bitbucket_repo: bitbucket_repo.clone(),
                bitbucket_pass: bitbucket_pass.clone(),
            };
            if update.is_empty() {
                return Err(Error::Input(
                    "nothing to update: pass at least one --jira-* or --bitbucket-* flag"
                        .to_string(),
                ));
            }
            connections::save(client, &update)?;
            println!("Credentials saved.");
            Ok(())
        }
    }
}
