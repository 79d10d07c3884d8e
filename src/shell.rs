use std::io::{BufRead, Write};

use crate::api::ApiTransport;
use crate::connections;
use crate::dashboard::{Alert, AtlassianTab, Dashboard, View};
use crate::domains::{bitbucket, jira};
use crate::error::{Error, Result};
use crate::filters::{ALL_STATUSES, ALL_USERS, DateRange, TaskStatus, parse_timestamp};

const HELP: &str = "\
commands:
  view todo|atlassian|connections   switch view
  tab jira|bitbucket                switch Atlassian tab
  status all|completed|pending      task status filter
  jira-user <id>                    Jira assignee filter ('all' for everyone)
  jira-status <name>                Jira status filter ('All Statuses' for any)
  bitbucket-user <id>               Bitbucket author filter
  range <start> [end]               date window (YYYY-MM-DD or RFC 3339)
  range clear                       drop the date window
  add <text>                        add a task
  done <id>                         toggle a task's completion
  rm <id>                           delete a task
  summarize                         summarize what's on screen
  show                              print the current view
  users                             list users for the active tab's filter
  statuses                          list Jira statuses
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    View(View),
    Tab(AtlassianTab),
    Status(TaskStatus),
    JiraUser(String),
    JiraStatus(String),
    BitbucketUser(String),
    Range(DateRange),
    Add(String),
    Done(String),
    Rm(String),
    Summarize,
    Show,
    Users,
    Statuses,
    Help,
    Quit,
}

/// Everything after the first word, or an error naming the command.
fn rest(line: &str, command: &str) -> Result<String> {
    let tail = line[command.len()..].trim();
    if tail.is_empty() {
        return Err(Error::Input(format!("{command} needs an argument")));
    }
    Ok(tail.to_string())
}

pub fn parse_command(line: &str) -> Result<ShellCommand> {
    let mut words = line.split_whitespace();
    let head = words
        .next()
        .ok_or_else(|| Error::Input("empty command".to_string()))?;

    match head {
        "view" => match words.next() {
            Some("todo") | Some("tasks") => Ok(ShellCommand::View(View::Todo)),
            Some("atlassian") => Ok(ShellCommand::View(View::Atlassian)),
            Some("connections") => Ok(ShellCommand::View(View::Connections)),
            other => Err(Error::Input(format!(
                "unknown view: {} (expected: todo, atlassian, connections)",
                other.unwrap_or("")
            ))),
        },
        "tab" => match words.next() {
            Some("jira") => Ok(ShellCommand::Tab(AtlassianTab::Jira)),
            Some("bitbucket") => Ok(ShellCommand::Tab(AtlassianTab::Bitbucket)),
            other => Err(Error::Input(format!(
                "unknown tab: {} (expected: jira, bitbucket)",
                other.unwrap_or("")
            ))),
        },
        "status" => {
            let arg = words
                .next()
                .ok_or_else(|| Error::Input("status needs an argument".to_string()))?;
            Ok(ShellCommand::Status(arg.parse()?))
        }
        "jira-user" => Ok(ShellCommand::JiraUser(rest(line, "jira-user")?)),
        "jira-status" => Ok(ShellCommand::JiraStatus(rest(line, "jira-status")?)),
        "bitbucket-user" => Ok(ShellCommand::BitbucketUser(rest(line, "bitbucket-user")?)),
        "range" => {
            let first = words
                .next()
                .ok_or_else(|| Error::Input("range needs dates or 'clear'".to_string()))?;
            if first == "clear" {
                return Ok(ShellCommand::Range(DateRange::default()));
            }
            let start = parse_timestamp(first)?;
            let end = words.next().map(parse_timestamp).transpose()?;
            Ok(ShellCommand::Range(DateRange::new(Some(start), end)))
        }
        "add" => Ok(ShellCommand::Add(rest(line, "add")?)),
        "done" => Ok(ShellCommand::Done(rest(line, "done")?)),
        "rm" => Ok(ShellCommand::Rm(rest(line, "rm")?)),
        "summarize" => Ok(ShellCommand::Summarize),
        "show" => Ok(ShellCommand::Show),
        "users" => Ok(ShellCommand::Users),
        "statuses" => Ok(ShellCommand::Statuses),
        "help" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(Error::Input(format!(
            "unknown command: {other} (try 'help')"
        ))),
    }
}

fn report(output: &mut dyn Write, alerts: &[Alert]) -> Result<()> {
    for alert in alerts {
        writeln!(output, "{alert}")?;
    }
    Ok(())
}

fn show(
    dashboard: &Dashboard,
    client: &dyn ApiTransport,
    output: &mut dyn Write,
) -> Result<()> {
    writeln!(output, "{}", dashboard.title())?;
    match dashboard.view() {
        View::Todo => {
            if dashboard.tasks().is_empty() {
                writeln!(output, "No tasks yet. Add one above!")?;
            } else {
                for task in dashboard.tasks() {
                    let mark = if task.completed { "x" } else { " " };
                    writeln!(output, "[{mark}] {}  {}", task.id, task.text)?;
                }
                let completed = dashboard.tasks().iter().filter(|t| t.completed).count();
                let pending = dashboard.tasks().len() - completed;
                writeln!(output, "{completed} completed, {pending} pending")?;
            }
        }
        View::Atlassian => match dashboard.tab() {
            AtlassianTab::Jira => {
                if dashboard.issues().is_empty() {
                    writeln!(
                        output,
                        "No Jira issues found. Check your connections or adjust your filters."
                    )?;
                } else {
                    for issue in dashboard.issues() {
                        writeln!(
                            output,
                            "{}: {} [{}]",
                            issue.key, issue.fields.summary, issue.fields.status.name
                        )?;
                    }
                }
            }
            AtlassianTab::Bitbucket => {
                if dashboard.commits().is_empty() {
                    writeln!(output, "No Bitbucket commits found. Check your connections.")?;
                } else {
                    for commit in dashboard.commits() {
                        writeln!(
                            output,
                            "{}: {} ({})",
                            commit.short_hash(),
                            commit.message,
                            commit.author_name()
                        )?;
                    }
                }
            }
        },
        View::Connections => match connections::fetch(client) {
            Ok(settings) => {
                let jira = if settings.jira_configured {
                    format!(
                        "configured ({}, {}, {})",
                        settings.jira_user, settings.jira_url, settings.jira_project
                    )
                } else {
                    "not configured".to_string()
                };
                let bitbucket = if settings.bitbucket_configured {
                    format!(
                        "configured ({}, {}/{})",
                        settings.bitbucket_user,
                        settings.bitbucket_workspace,
                        settings.bitbucket_repo
                    )
                } else {
                    "not configured".to_string()
                };
                writeln!(output, "Jira: {jira}")?;
                writeln!(output, "Bitbucket: {bitbucket}")?;
            }
            Err(_) => writeln!(output, "Could not load existing connection details.")?,
        },
    }
    if !dashboard.summary().is_empty() {
        writeln!(output, "Summary:\n{}", dashboard.summary())?;
    }
    Ok(())
}

fn show_users(
    dashboard: &Dashboard,
    client: &dyn ApiTransport,
    output: &mut dyn Write,
) -> Result<()> {
    match (dashboard.view(), dashboard.tab()) {
        (View::Atlassian, AtlassianTab::Jira) => {
            writeln!(output, "{ALL_USERS}  All Users")?;
            for user in jira::fetch_users(client).unwrap_or_default() {
                writeln!(output, "{}  {}", user.account_id, user.display_name)?;
            }
        }
        (View::Atlassian, AtlassianTab::Bitbucket) => {
            writeln!(output, "{ALL_USERS}  All Users")?;
            for member in bitbucket::fetch_members(client).unwrap_or_default() {
                let id = member.uuid.as_deref().unwrap_or("-");
                writeln!(output, "{id}  {}", member.name())?;
            }
        }
        _ => writeln!(output, "no user filter on this view")?,
    }
    Ok(())
}

fn show_statuses(client: &dyn ApiTransport, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "{ALL_STATUSES}")?;
    for status in jira::fetch_statuses(client).unwrap_or_default() {
        writeln!(output, "{}", status.name)?;
    }
    Ok(())
}

/// Drive a dashboard session over arbitrary line-based IO. Each command
/// mutates state, then a sync pass fetches whatever the mutation made
/// stale and prints any fetch alerts.
pub fn run(
    dashboard: &mut Dashboard,
    client: &dyn ApiTransport,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<()> {
    writeln!(output, "{}", dashboard.title())?;
    let alerts = dashboard.sync(client);
    report(output, &alerts)?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => writeln!(output, "{HELP}")?,
            ShellCommand::View(view) => {
                dashboard.switch_view(view);
                writeln!(output, "{}", dashboard.title())?;
            }
            ShellCommand::Tab(tab) => dashboard.set_tab(tab),
            ShellCommand::Status(status) => dashboard.set_task_status(status),
            ShellCommand::JiraUser(user) => dashboard.set_jira_user(user),
            ShellCommand::JiraStatus(status) => dashboard.set_jira_status(status),
            ShellCommand::BitbucketUser(user) => dashboard.set_bitbucket_user(user),
            ShellCommand::Range(range) => dashboard.set_date_range(range),
            ShellCommand::Add(text) => dashboard.add_task(client, &text),
            ShellCommand::Done(id) => dashboard.toggle_task(client, &id),
            ShellCommand::Rm(id) => dashboard.delete_task(client, &id),
            ShellCommand::Summarize => {
                dashboard.summarize_current(client);
                if !dashboard.summary().is_empty() {
                    writeln!(output, "Summary:\n{}", dashboard.summary())?;
                }
            }
            ShellCommand::Show => show(dashboard, client, output)?,
            ShellCommand::Users => show_users(dashboard, client, output)?,
            ShellCommand::Statuses => show_statuses(client, output)?,
        }

        let alerts = dashboard.sync(client);
        report(output, &alerts)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_helpers::{MockTransport, commit_json, issue_json, task_json};
    use serde_json::json;
    use std::io::Cursor;

    fn run_session(client: &MockTransport, script: &str) -> String {
        let mut dashboard = Dashboard::new();
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        run(&mut dashboard, client, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    // --- parser ---

    #[test]
    fn test_parse_view() {
        assert_eq!(
            parse_command("view atlassian").unwrap(),
            ShellCommand::View(View::Atlassian)
        );
        assert_eq!(
            parse_command("view tasks").unwrap(),
            ShellCommand::View(View::Todo)
        );
        assert!(parse_command("view nowhere").is_err());
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(
            parse_command("status pending").unwrap(),
            ShellCommand::Status(TaskStatus::Pending)
        );
        assert_eq!(
            parse_command("jira-status In Progress").unwrap(),
            ShellCommand::JiraStatus("In Progress".to_string())
        );
        assert_eq!(
            parse_command("bitbucket-user u-12").unwrap(),
            ShellCommand::BitbucketUser("u-12".to_string())
        );
    }

    #[test]
    fn test_parse_range() {
        match parse_command("range 2024-03-01 2024-03-31").unwrap() {
            ShellCommand::Range(range) => {
                assert!(range.start.is_some());
                assert!(range.end.is_some());
            }
            other => panic!("expected Range, got {other:?}"),
        }
        assert_eq!(
            parse_command("range clear").unwrap(),
            ShellCommand::Range(DateRange::default())
        );
        assert!(parse_command("range soon").is_err());
    }

    #[test]
    fn test_parse_add_keeps_spaces() {
        assert_eq!(
            parse_command("add Buy milk and eggs").unwrap(),
            ShellCommand::Add("Buy milk and eggs".to_string())
        );
        assert!(parse_command("add").is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_command("frobnicate").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    // --- session ---

    #[test]
    fn test_session_starts_with_title_and_fetch() {
        let client = MockTransport::new(vec![Ok(json!([]))]);
        let output = run_session(&client, "quit\n");
        assert!(output.starts_with("To-Do List"));
        assert_eq!(client.calls()[0].path, "/tasks");
        assert_eq!(client.calls()[0].query_value("status"), Some("all"));
    }

    #[test]
    fn test_show_empty_tasks() {
        let client = MockTransport::new(vec![Ok(json!([]))]);
        let output = run_session(&client, "show\nquit\n");
        assert!(output.contains("No tasks yet. Add one above!"));
    }

    #[test]
    fn test_add_then_show() {
        let client = MockTransport::new(vec![
            Ok(json!([])),
            Ok(task_json("t1", "Buy milk", false)),
            Ok(json!([task_json("t1", "Buy milk", false)])),
        ]);
        let output = run_session(&client, "add Buy milk\nshow\nquit\n");
        assert!(output.contains("[ ] t1  Buy milk"));
        assert!(output.contains("0 completed, 1 pending"));
    }

    #[test]
    fn test_unknown_command_keeps_session_alive() {
        let client = MockTransport::new(vec![Ok(json!([]))]);
        let output = run_session(&client, "frobnicate\nquit\n");
        assert!(output.contains("unknown command"));
    }

    #[test]
    fn test_atlassian_alert_on_jira_failure() {
        let client = MockTransport::new(vec![
            Ok(json!([])),
            Err(Error::Server {
                status: 401,
                message: "bad token".to_string(),
            }),
            Ok(json!([commit_json("a1b2c3d4e5f6", "Fix sync", "Ana")])),
        ]);
        let output = run_session(&client, "view atlassian\ntab bitbucket\nshow\nquit\n");
        assert!(output.contains("Jira Error: bad token"));
        assert!(output.contains("a1b2c3d: Fix sync (Ana)"));
    }

    #[test]
    fn test_jira_show_lists_issues() {
        let client = MockTransport::new(vec![
            Ok(json!([])),
            Ok(json!([issue_json("OPS-1", "Fix login", "To Do")])),
            Ok(json!([])),
        ]);
        let output = run_session(&client, "view atlassian\nshow\nquit\n");
        assert!(output.contains("OPS-1: Fix login [To Do]"));
    }

    #[test]
    fn test_summarize_prints_summary() {
        let client = MockTransport::new(vec![
            Ok(json!([task_json("t1", "Buy milk", false)])),
            Ok(json!({ "summary": "- milk" })),
        ]);
        let output = run_session(&client, "summarize\nquit\n");
        assert!(output.contains("Summary:\n- milk"));
    }

    #[test]
    fn test_switching_to_atlassian_drops_old_summary() {
        let client = MockTransport::new(vec![
            Ok(json!([task_json("t1", "Buy milk", false)])),
            Ok(json!({ "summary": "- milk" })),
            Ok(json!([])),
            Ok(json!([])),
        ]);
        let output = run_session(&client, "summarize\nview atlassian\nshow\nquit\n");
        // The summary printed once after summarize, then the Atlassian
        // show has none left.
        let after_switch = output.split("Atlassian Dashboard").last().unwrap();
        assert!(!after_switch.contains("- milk"));
    }

    #[test]
    fn test_statuses_lists_sentinel_first() {
        let client = MockTransport::new(vec![
            Ok(json!([])),
            Ok(json!([{ "id": "1", "name": "To Do" }])),
        ]);
        let output = run_session(&client, "statuses\nquit\n");
        let all = output.find("All Statuses").unwrap();
        let todo = output.find("To Do").unwrap();
        assert!(all < todo);
    }

    #[test]
    fn test_users_on_todo_view() {
        let client = MockTransport::new(vec![Ok(json!([]))]);
        let output = run_session(&client, "users\nquit\n");
        assert!(output.contains("no user filter on this view"));
    }
}
