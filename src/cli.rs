//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `scripter`.
#[derive(Debug, Parser)]
#[command(name = "scripter", version, about = "Run shell command blocks and keep them as shortcuts")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a block of commands, one per line, stopping at the first failure.
    Run(RunArgs),
    /// Run a single command through the shell.
    Exec {
        /// Command text passed to the shell as-is.
        command: String,
        /// Directory to run in.
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Manage saved shortcuts.
    #[command(subcommand)]
    Shortcut(ShortcutCommand),
}

/// Where `run` takes its command block from.
#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("source").required(true).args(["commands", "file", "shortcut"])
))]
pub struct RunArgs {
    /// Command block; separate commands with newlines.
    pub commands: Option<String>,
    /// Read the command block from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Run a saved shortcut, by id or name.
    #[arg(long, value_name = "ID|NAME")]
    pub shortcut: Option<String>,
    /// Directory the first command runs in.
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

/// `scripter shortcut` subcommands.
#[derive(Debug, Subcommand)]
pub enum ShortcutCommand {
    /// Save a command block under a name.
    #[command(group(
        clap::ArgGroup::new("source").required(true).args(["commands", "file"])
    ))]
    Save {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Free-form description.
        #[arg(long, default_value = "")]
        description: String,
        /// Command block; separate commands with newlines.
        #[arg(long)]
        commands: Option<String>,
        /// Read the command block from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Directory the block starts in.
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// List saved shortcuts.
    List,
    /// Print one shortcut.
    Show {
        /// Shortcut id or name.
        key: String,
    },
    /// Delete a shortcut.
    Delete {
        /// Shortcut id.
        id: String,
    },
}
