//! CLI command implementations.

use super::{command_signature, PreCommitArgs, Selection};
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::banner::ExternalBanner;
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::files::{self, FileSet};
use crate::core::git::GitRepo;
use crate::core::hooks::{self, HookScript, InstallResult, SkipReason, TerminalConfirm, HOOK_NAME};
use crate::core::pipeline::Pipeline;
use crate::core::stages::StageOptions;
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Environment variable that skips all checks when set to `1`.
pub const SKIP_ENV: &str = "COMMIT_GATE_SKIP";

/// Flags that apply to every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Globals {
    /// `--ansi` was given.
    pub ansi: bool,
    /// `--quiet` was given.
    pub quiet: bool,
}

/// Initialize configuration.
pub fn init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    let toml = Config::default_toml()?;
    std::fs::write(&config_path, toml).map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Review the tool paths and coding standard in {CONFIG_FILE_NAME}");
    eprintln!("  2. Run: commit-gate pre-commit --install");

    Ok(ExitCode::SUCCESS)
}

/// Check files, or install the hook.
pub fn pre_commit(args: &PreCommitArgs, globals: Globals) -> Result<ExitCode> {
    let selection = args.selection();
    if selection == Selection::Install {
        return install();
    }

    if std::env::var(SKIP_ENV).ok().as_deref() == Some("1") {
        eprintln!("{} Skipping checks ({SKIP_ENV}=1)", style("•").cyan());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load_or_default()?;
    let repo = GitRepo::discover()?;
    let runner = Executor::new();

    let files = select_files(&selection, &config, &repo, &runner)?;
    tracing::debug!(count = files.len(), ?selection, "selected files");

    let options = StageOptions {
        ansi: globals.ansi,
        quiet: globals.quiet,
    };
    let banner = ExternalBanner::new(&config.banner, &runner);
    let pipeline = Pipeline::new(&config, &repo, &runner, Box::new(banner), options);

    let outcome = pipeline.run(&files)?;
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Resolves the working file set for a selection.
fn select_files(
    selection: &Selection,
    config: &Config,
    repo: &GitRepo,
    runner: &Executor,
) -> Result<FileSet> {
    let filter = config.source_filter();
    match selection {
        Selection::Path(dir) => files::walk(repo.root(), dir, &filter, &config.ignore_list()?),
        Selection::AllFiles => files::walk(repo.root(), Path::new(""), &filter, &config.ignore_list()?),
        Selection::Changed => Ok(filter.to_source_files(&repo.changed_files(runner)?)),
        Selection::Install => Ok(FileSet::new()),
    }
}

/// Install git hook.
pub fn install() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let hook_path = repo.hook_path(HOOK_NAME);

    let executable = std::env::current_exe()
        .and_then(|p| p.canonicalize())
        .map_err(|e| Error::io("locate executable", e))?;
    let script = HookScript::for_command(&executable, &command_signature()?);

    match hooks::install(&hook_path, &script, &TerminalConfirm) {
        InstallResult::Installed | InstallResult::Overwritten => {
            eprintln!(
                "{} Hook pre-commit successfully installed at {}",
                style("✓").green(),
                hook_path.display()
            );
            Ok(ExitCode::SUCCESS)
        },
        InstallResult::Skipped(SkipReason::AlreadyInstalled) => {
            eprintln!(
                "{} Hook already installed at {}",
                style("✓").green(),
                hook_path.display()
            );
            Ok(ExitCode::SUCCESS)
        },
        InstallResult::Skipped(SkipReason::Declined) => {
            eprintln!(
                "{} Kept existing hook at {}",
                style("•").cyan(),
                hook_path.display()
            );
            Ok(ExitCode::SUCCESS)
        },
        InstallResult::Failed(e) => {
            eprintln!("{} Unable to install pre-commit hook: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}
