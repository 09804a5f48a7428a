//! Command-line interface for taskman
//!
//! This module defines the CLI structure using clap derive macros.
//! Subcommands are implemented in the `auth` and `task` submodules; `ui`
//! hands over to the terminal UI.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::Result;
use crate::filter::TaskFilter;
use crate::output::OutputOptions;
use crate::storage::FileStore;
use crate::task::TaskId;
use crate::tracker::Tracker;

mod auth;
mod task;

/// taskman - Task Manager
///
/// Personal task tracking: log in with a username and password (first login
/// registers), then add, edit, complete, delete and filter your tasks.
#[derive(Parser, Debug)]
#[command(name = "taskman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the store file
    #[arg(long, global = true, env = "TASKMAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "TASKMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging for taskman
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, registering the username on first use
    Login {
        /// Username
        username: String,

        /// Password
        #[arg(long, env = "TASKMAN_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },

    /// Log out of the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Add a task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Toggle a task between complete and incomplete
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Rename a task
    Edit {
        /// Task ID
        id: TaskId,

        /// New title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: TaskId,
    },

    /// List tasks
    List {
        /// Filter: all, completed, incomplete
        #[arg(short, long)]
        filter: Option<TaskFilter>,
    },

    /// Open the interactive terminal UI
    Ui,
}

/// Resolved config and store shared by every subcommand
pub(crate) struct Context {
    pub(crate) config: Config,
    pub(crate) store: FileStore,
    pub(crate) output: OutputOptions,
}

impl Context {
    fn load(data_dir: Option<&Path>, config_path: Option<&Path>, output: OutputOptions) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .or_else(config::default_config_path);
        let config = Config::load_or_default(config_path.as_deref())?;

        let dir = config.data_dir(data_dir);
        tracing::debug!(data_dir = %dir.display(), "opening store");
        let store = FileStore::new(dir).with_lock_timeout(config.storage.lock_timeout_ms);

        Ok(Self {
            config,
            store,
            output,
        })
    }

    /// Tracker with the active user's task list loaded
    pub(crate) fn tracker(&self) -> Result<Tracker<FileStore>> {
        Tracker::open(self.store.clone(), self.config.storage.on_corrupt)
    }

    /// Tracker with only the session pointer read
    pub(crate) fn session(&self) -> Result<Tracker<FileStore>> {
        Tracker::restore(self.store.clone(), self.config.storage.on_corrupt)
    }
}

fn join_title(words: &[String]) -> String {
    words.join(" ")
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::load(self.data_dir.as_deref(), self.config.as_deref(), output)?;

        match self.command {
            Commands::Login { username, password } => auth::run_login(
                &ctx,
                auth::LoginOptions {
                    username,
                    password,
                },
            ),
            Commands::Logout => auth::run_logout(&ctx),
            Commands::Whoami => auth::run_whoami(&ctx),
            Commands::Add { title } => task::run_add(
                &ctx,
                task::AddOptions {
                    title: join_title(&title),
                },
            ),
            Commands::Done { id } => task::run_done(&ctx, task::IdOptions { id }),
            Commands::Edit { id, title } => task::run_edit(
                &ctx,
                task::EditOptions {
                    id,
                    title: join_title(&title),
                },
            ),
            Commands::Rm { id } => task::run_rm(&ctx, task::IdOptions { id }),
            Commands::List { filter } => task::run_list(&ctx, task::ListOptions { filter }),
            Commands::Ui => {
                let tracker = ctx.session()?;
                crate::ui::run(tracker, &ctx.config.ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_joins_words() {
        let cli = Cli::try_parse_from(["taskman", "add", "buy", "milk"]).unwrap();
        match cli.command {
            Commands::Add { title } => assert_eq!(join_title(&title), "buy milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_filter_parses() {
        let cli = Cli::try_parse_from(["taskman", "list", "--filter", "completed"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                filter: Some(TaskFilter::Completed)
            }
        ));
        assert!(Cli::try_parse_from(["taskman", "list", "--filter", "done"]).is_err());
    }

    #[test]
    fn done_requires_numeric_id() {
        assert!(Cli::try_parse_from(["taskman", "done", "abc"]).is_err());
    }
}
