//! Command-line interface for commit-gate.
//!
//! This module provides the `commit-gate` CLI with subcommands for:
//! - `pre-commit`: Check files, or install the hook with `--install` (default)
//! - `init`: Write the default configuration file

mod commands;

use crate::core::error::{Error, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Name of the checking subcommand, re-invoked by the installed hook.
pub const PRE_COMMIT_COMMAND: &str = "pre-commit";

/// Git pre-commit gate: lint, style-check and auto-fix changed source files.
#[derive(Debug, Parser)]
#[command(
    name = "commit-gate",
    author,
    version,
    about = "Git pre-commit gate: lint, style-check and auto-fix changed source files",
    long_about = r#"
commit-gate lints the source files you are about to commit, checks them
against your coding standard, and runs the fixer when the standard is
violated. Fixed files are re-staged automatically.

Quick start:
  commit-gate init                    # Create commit-gate.toml
  commit-gate pre-commit --install    # Install git hook
  # Done! Every commit is now checked.

Environment variables:
  COMMIT_GATE_SKIP=1   Skip all checks
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not echo tool reports.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Force colored output, also for the external tools.
    #[arg(long, global = true)]
    pub ansi: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check files before a commit.
    #[command(name = PRE_COMMIT_COMMAND)]
    PreCommit(PreCommitArgs),

    /// Write the default configuration file.
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },
}

/// Options of the `pre-commit` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct PreCommitArgs {
    /// Install the git pre-commit hook.
    #[arg(long)]
    pub install: bool,

    /// Check every source file under this directory.
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Check every source file in the repository.
    #[arg(long)]
    pub all_files: bool,
}

/// What a `pre-commit` invocation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Install the hook; no files are checked.
    Install,
    /// Walk a directory below the repository root.
    Path(PathBuf),
    /// Walk the whole repository.
    AllFiles,
    /// Files reported as modified or added by git.
    Changed,
}

impl PreCommitArgs {
    /// Resolves the flags by precedence: install, path, all files, changes.
    #[must_use]
    pub fn selection(&self) -> Selection {
        if self.install {
            Selection::Install
        } else if let Some(ref path) = self.path {
            Selection::Path(path.clone())
        } else if self.all_files {
            Selection::AllFiles
        } else {
            Selection::Changed
        }
    }
}

/// Returns the token the hook uses to re-invoke the checking command.
pub fn command_signature() -> Result<String> {
    let cli = Cli::command();
    cli.find_subcommand(PRE_COMMIT_COMMAND)
        .and_then(|c| c.get_name().split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| Error::Internal {
            message: format!("Cannot read signature of {PRE_COMMIT_COMMAND}"),
        })
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.ansi);

    let globals = commands::Globals {
        ansi: cli.ansi,
        quiet: cli.quiet,
    };

    // If no subcommand, check the change set (same as `commit-gate pre-commit`)
    match cli.command {
        Some(Commands::PreCommit(args)) => commands::pre_commit(&args, globals),
        Some(Commands::Init { force }) => commands::init(force),
        None => commands::pre_commit(&PreCommitArgs::default(), globals),
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Forces color output when `--ansi` is given; otherwise console auto-detects.
fn setup_color(ansi: bool) {
    if ansi {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
    }
}
