//! The verification pipeline.
//!
//! ```text
//! Start ─▶ Linting ─┬─▶ LintFailed
//!                   └─▶ StyleChecking ─┬─▶ Clean
//!                                      └─▶ Fixing ─┬─▶ StyleFailedAndFixed
//!                                                  └─▶ StyleFailedAndUnfixable
//! ```
//!
//! An empty file set is `Clean` without running anything.

use crate::config::Config;
use crate::core::banner::Banner;
use crate::core::error::Result;
use crate::core::executor::ProcessRunner;
use crate::core::files::FileSet;
use crate::core::git::GitRepo;
use crate::core::stages::{
    AutoFixStage, FixVerdict, LintStage, LintVerdict, StageOptions, StyleCheckStage, StyleVerdict,
};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Message shown when linting fails.
pub const LINT_FAILURE_MESSAGE: &str = "Commit aborted: you have errors in your code!";

/// Message shown when the fixer cannot fix the violations.
pub const UNFIXABLE_MESSAGE: &str = "Unable to fix violations.";

/// Final result of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Nothing to check, or every stage passed.
    Clean,
    /// Syntax errors; the commit is blocked.
    LintFailed,
    /// Style violations were found and auto-corrected.
    StyleFailedAndFixed,
    /// Style violations the fixer could not handle.
    StyleFailedAndUnfixable,
}

impl PipelineOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Clean | Self::StyleFailedAndFixed => 0,
            Self::LintFailed | Self::StyleFailedAndUnfixable => 1,
        }
    }

    /// Returns true if the commit may proceed.
    #[must_use]
    pub const fn success(self) -> bool {
        self.exit_code() == 0
    }
}

/// Runs lint, style check and auto-fix over one file set.
pub struct Pipeline<'a, R: ?Sized> {
    config: &'a Config,
    repo: &'a GitRepo,
    runner: &'a R,
    banner: Box<dyn Banner + 'a>,
    options: StageOptions,
}

impl<R: ?Sized> std::fmt::Debug for Pipeline<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.repo.root())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a, R: ProcessRunner + ?Sized> Pipeline<'a, R> {
    /// Creates a pipeline.
    pub fn new(
        config: &'a Config,
        repo: &'a GitRepo,
        runner: &'a R,
        banner: Box<dyn Banner + 'a>,
        options: StageOptions,
    ) -> Self {
        Self {
            config,
            repo,
            runner,
            banner,
            options,
        }
    }

    /// Runs the pipeline over `files`.
    ///
    /// Errors are reserved for tools that cannot be run at all; failing
    /// checks are reported through the outcome.
    pub fn run(&self, files: &FileSet) -> Result<PipelineOutcome> {
        if files.is_empty() {
            eprintln!("{} Nothing to check!", style("•").cyan());
            return Ok(PipelineOutcome::Clean);
        }

        tracing::debug!(count = files.len(), "running pipeline");
        let root = self.repo.root();
        let tools = &self.config.tools;

        let lint = LintStage::new(&tools.lint, root, self.options);
        let (verdict, result) = self.with_spinner("Running lint...", || lint.run(self.runner, files))?;
        result.echo(self.options);

        if verdict == LintVerdict::Failed {
            let banner = self.banner.render(LINT_FAILURE_MESSAGE);
            eprintln!("{}", style(banner).red());
            return Ok(PipelineOutcome::LintFailed);
        }
        eprintln!("{} lint", style("✓").green());

        let style_check = StyleCheckStage::new(
            &tools.style,
            &self.config.style,
            &self.config.files.ignored,
            root,
            self.options,
        );
        let (verdict, result) = self.with_spinner("Checking coding standard...", || {
            style_check.run(self.runner, files)
        })?;
        result.echo(self.options);

        if verdict == StyleVerdict::Compliant {
            eprintln!("{} coding standard", style("✓").green());
            eprintln!("{} All done!", style("✓").green().bold());
            return Ok(PipelineOutcome::Clean);
        }
        eprintln!("{} coding standard", style("✗").yellow());

        let fixer = AutoFixStage::new(&tools.fixer, &self.config.style, self.repo, self.options);
        let (verdict, result) =
            self.with_spinner("Running fixer...", || fixer.run(self.runner, files))?;
        result.echo(self.options);

        match verdict {
            FixVerdict::Fixed => {
                eprintln!(
                    "{} Coding standard violations were auto-corrected and {} file(s) re-staged",
                    style("✓").green().bold(),
                    files.len()
                );
                Ok(PipelineOutcome::StyleFailedAndFixed)
            },
            FixVerdict::Failed => {
                eprintln!(
                    "{} {UNFIXABLE_MESSAGE} (fixer exited with {})",
                    style("✗").red().bold(),
                    result.exit_code
                );
                Ok(PipelineOutcome::StyleFailedAndUnfixable)
            },
        }
    }

    fn with_spinner<T>(&self, message: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.options.quiet {
            return f();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .ok()
                .unwrap_or_else(ProgressStyle::default_spinner),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = f();

        pb.finish_and_clear();
        result
    }
}
