use clap::{Parser, Subcommand};

/// standup — terminal client for the work dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "standup", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Service origin, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account (does not log in)
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Drop the persisted session
    Logout,

    /// Interactive dashboard session
    Board,

    /// To-do list operations
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },

    /// List Jira issues
    Jira {
        /// Assignee account id ('all' for everyone)
        #[arg(long)]
        user: Option<String>,

        /// Status name ('All Statuses' for any)
        #[arg(long)]
        status: Option<String>,

        /// Start of the date window (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// End of the date window
        #[arg(long)]
        to: Option<String>,
    },

    /// List Bitbucket commits
    Commits {
        /// Author id ('all' for everyone)
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Stored third-party connection credentials
    Connections {
        #[command(subcommand)]
        command: ConnectionsCommand,
    },

    /// Fetch a collection and summarize it (tasks, jira, commits)
    Summarize {
        /// What to summarize: tasks, jira, or commits
        target: String,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TasksCommand {
    /// List tasks under the current filter
    List {
        /// all, completed, or pending
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Add a task
    Add {
        text: String,
    },

    /// Toggle a task's completion
    Done {
        id: String,
    },

    /// Delete a task
    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConnectionsCommand {
    /// Show stored connection metadata (secrets are never echoed)
    Show,

    /// Update connection fields; tokens are sent only when given
    Set {
        #[arg(long)]
        jira_user: Option<String>,

        #[arg(long)]
        jira_url: Option<String>,

        #[arg(long)]
        jira_project: Option<String>,

        #[arg(long)]
        jira_token: Option<String>,

        #[arg(long)]
        bitbucket_user: Option<String>,

        #[arg(long)]
        bitbucket_workspace: Option<String>,

        #[arg(long)]
        bitbucket_repo: Option<String>,

        #[arg(long)]
        bitbucket_pass: Option<String>,
    },
}
