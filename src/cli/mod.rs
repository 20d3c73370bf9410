//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Manage Basic projects and keep your schema in sync
#[derive(Parser, Debug)]
#[command(name = "basic", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// API base URL (default: https://api.basic.tech)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Project directory holding basic.config.* (default: current directory)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in through the browser
    Login,

    /// Remove the stored token
    Logout,

    /// Show the logged-in account
    Account,

    /// List your projects
    Projects,

    /// Create a new project or link an existing one
    Init(InitArgs),

    /// Compare the local schema with the published one
    Status,

    /// Publish the local schema
    Push(ConfirmArgs),

    /// Replace the local schema with the published one
    Pull(ConfirmArgs),

    /// Update the CLI to the latest release
    Update,

    /// Show where the CLI keeps its files
    Debug,

    /// Show version information
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Create a new project with this name
    #[arg(long, conflicts_with = "project_id")]
    pub name: Option<String>,

    /// Link an existing project by id
    #[arg(long)]
    pub project_id: Option<String>,

    /// Write basic.config.js instead of basic.config.ts
    #[arg(long)]
    pub js: bool,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct VersionArgs {
    /// Also ask GitHub whether a newer release exists
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    PowerShell,
    Elvish,
}
