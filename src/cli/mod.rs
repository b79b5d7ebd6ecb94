//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::{Gateway, HttpGateway};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::local::LocalGateway;
use crate::output::OutputOptions;

mod comments;
mod org;
mod seed;
mod tasks;

/// taskboard - terminal client for the project-management backend
///
/// Browses organizations, tasks, and comment threads over the backend's
/// GraphQL API, and adds comments to tasks.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding .taskboard.toml (defaults to current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// GraphQL endpoint URL (overrides the config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Organization slug to operate in (overrides the config file)
    #[arg(long, global = true, env = "TASKBOARD_ORG")]
    pub org: Option<String>,

    /// Serve from JSONL files in this directory instead of the backend
    #[arg(long, global = true, env = "TASKBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Organization commands
    #[command(subcommand)]
    Org(OrgCommands),

    /// Task commands
    #[command(subcommand)]
    Tasks(TasksCommands),

    /// Comment thread commands
    #[command(subcommand)]
    Comments(CommentsCommands),

    /// Open the interactive board
    Ui,

    /// Seed a data directory with demo records
    Seed {
        /// Target directory (defaults to --data-dir)
        dir: Option<PathBuf>,
    },
}

/// Organization subcommands
#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organizations visible to this client
    List,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TasksCommands {
    /// Show tasks grouped into status columns
    Board {
        /// Restrict to one project
        #[arg(long)]
        project: Option<String>,
    },

    /// Show tasks as a flat list
    List {
        /// Restrict to one project
        #[arg(long)]
        project: Option<String>,
    },
}

/// Comment subcommands
#[derive(Subcommand, Debug)]
pub enum CommentsCommands {
    /// List the comment thread for a task
    List {
        /// Task id
        task: String,
    },

    /// Add a comment to a task
    Add {
        /// Task id
        task: String,

        /// Comment content
        #[arg(short, long)]
        message: String,

        /// Author email (defaults to author.email from the config)
        #[arg(long)]
        author: Option<String>,
    },
}

/// Resolved environment shared by every subcommand.
pub(crate) struct CommandContext {
    pub(crate) config: Config,
    pub(crate) gateway: Box<dyn Gateway>,
    pub(crate) organization_slug: String,
    pub(crate) output: OutputOptions,
}

impl CommandContext {
    /// The organization slug, or the precondition error every scoped
    /// command maps a missing one to.
    pub(crate) fn require_organization(&self) -> Result<&str> {
        let slug = self.organization_slug.trim();
        if slug.is_empty() {
            return Err(Error::NoOrganization);
        }
        Ok(slug)
    }
}

impl Cli {
    fn context(&self) -> Result<CommandContext> {
        let config_dir = self
            .config_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut config = Config::load(&config_dir)?;
        if let Some(endpoint) = self.endpoint.as_ref() {
            config.endpoint = endpoint.clone();
        }
        if let Some(org) = self.org.as_ref() {
            config.organization.slug = org.clone();
        }

        let gateway: Box<dyn Gateway> = match self.data_dir.as_ref() {
            Some(dir) => Box::new(LocalGateway::new(dir.clone())),
            None => Box::new(HttpGateway::new(config.endpoint.clone())?),
        };

        let organization_slug = config.organization.slug.clone();
        Ok(CommandContext {
            config,
            gateway,
            organization_slug,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        })
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Org(OrgCommands::List) => org::run_list(self.context()?),
            Commands::Tasks(TasksCommands::Board { project }) => {
                let project = project.clone();
                tasks::run_board(self.context()?, project)
            }
            Commands::Tasks(TasksCommands::List { project }) => {
                let project = project.clone();
                tasks::run_list(self.context()?, project)
            }
            Commands::Comments(CommentsCommands::List { task }) => {
                let task = task.clone();
                comments::run_list(self.context()?, task)
            }
            Commands::Comments(CommentsCommands::Add {
                task,
                message,
                author,
            }) => {
                let options = comments::AddOptions {
                    task: task.clone(),
                    message: message.clone(),
                    author: author.clone(),
                };
                comments::run_add(self.context()?, options)
            }
            Commands::Ui => {
                let context = self.context()?;
                crate::ui::run(context.gateway, context.config)
            }
            Commands::Seed { dir } => {
                let target = dir
                    .clone()
                    .or_else(|| self.data_dir.clone())
                    .ok_or_else(|| {
                        Error::InvalidArgument(
                            "seed needs a directory: pass one or set --data-dir".to_string(),
                        )
                    })?;
                seed::run(target, self.json, self.quiet)
            }
        }
    }
}
