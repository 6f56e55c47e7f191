//! The three pipeline stages.
//!
//! Each stage turns configuration plus a [`FileSet`] into one [`Invocation`],
//! runs it, and interprets the exit code:
//!
//! | Stage | Paths via | Success |
//! |---|---|---|
//! | [`LintStage`] | stdin | exit 0 |
//! | [`StyleCheckStage`] | trailing args | exit 0 |
//! | [`AutoFixStage`] | args | exit 0 or 1 |

use crate::config::{StyleConfig, ToolConfig};
use crate::core::error::Result;
use crate::core::executor::{Invocation, ProcessRunner};
use crate::core::files::FileSet;
use crate::core::git::GitRepo;
use std::path::Path;

/// Fixer exit codes treated as success: 0 = nothing to fix, 1 = fixed.
pub const FIXER_SUCCESS_CODES: [i32; 2] = [0, 1];

/// Flags shared by every stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOptions {
    /// Pass the tools their color flags.
    pub ansi: bool,
    /// Do not echo tool reports.
    pub quiet: bool,
}

/// Raw outcome of one stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    /// Tool exit code.
    pub exit_code: i32,
    /// Trimmed stdout lines.
    pub report: Vec<String>,
}

impl StageResult {
    /// Prints the report to stdout unless quiet or empty.
    pub fn echo(&self, options: StageOptions) {
        if options.quiet || self.report.is_empty() {
            return;
        }
        println!("{}", self.report.join("\n"));
    }
}

/// Syntax lint verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintVerdict {
    /// No syntax errors.
    Passed,
    /// At least one file failed to parse.
    Failed,
}

/// Style check verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleVerdict {
    /// All files follow the standard.
    Compliant,
    /// Violations were reported.
    Violations,
}

/// Auto-fix verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixVerdict {
    /// Fixer finished with a success-class code and files were re-staged.
    Fixed,
    /// Fixer exited with a code outside [`FIXER_SUCCESS_CODES`].
    Failed,
}

fn tool_args(tool: &ToolConfig, options: StageOptions) -> Vec<String> {
    let mut args = tool.args.clone();
    if options.ansi {
        args.extend(tool.color_args.iter().cloned());
    }
    args
}

fn run_stage<R: ProcessRunner + ?Sized>(runner: &R, invocation: &Invocation) -> Result<StageResult> {
    let output = runner.run(invocation)?;
    if !output.stderr.trim().is_empty() {
        tracing::debug!(program = %invocation.display_program(), stderr = %output.stderr.trim(), "tool stderr");
    }
    Ok(StageResult {
        exit_code: output.exit_code,
        report: output.stdout_lines(),
    })
}

/// Streams the file set to a syntax checker through stdin.
#[derive(Debug)]
pub struct LintStage<'a> {
    tool: &'a ToolConfig,
    root: &'a Path,
    options: StageOptions,
}

impl<'a> LintStage<'a> {
    /// Creates the stage.
    #[must_use]
    pub const fn new(tool: &'a ToolConfig, root: &'a Path, options: StageOptions) -> Self {
        Self {
            tool,
            root,
            options,
        }
    }

    /// Builds the invocation for `files`.
    #[must_use]
    pub fn invocation(&self, files: &FileSet) -> Invocation {
        Invocation::new(self.tool.resolve_program(self.root))
            .args(tool_args(self.tool, self.options))
            .stdin(files.iter().cloned())
            .cwd(self.root)
    }

    /// Runs the linter over `files`.
    pub fn run<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        files: &FileSet,
    ) -> Result<(LintVerdict, StageResult)> {
        let result = run_stage(runner, &self.invocation(files))?;
        let verdict = if result.exit_code == 0 {
            LintVerdict::Passed
        } else {
            LintVerdict::Failed
        };
        tracing::debug!(?verdict, exit_code = result.exit_code, "lint stage");
        Ok((verdict, result))
    }
}

/// Checks files against the configured coding standard.
#[derive(Debug)]
pub struct StyleCheckStage<'a> {
    tool: &'a ToolConfig,
    style: &'a StyleConfig,
    ignored: &'a [String],
    root: &'a Path,
    options: StageOptions,
}

impl<'a> StyleCheckStage<'a> {
    /// Creates the stage.
    #[must_use]
    pub const fn new(
        tool: &'a ToolConfig,
        style: &'a StyleConfig,
        ignored: &'a [String],
        root: &'a Path,
        options: StageOptions,
    ) -> Self {
        Self {
            tool,
            style,
            ignored,
            root,
            options,
        }
    }

    /// Builds the invocation for `files`.
    #[must_use]
    pub fn invocation(&self, files: &FileSet) -> Invocation {
        let mut args = self.tool.args.clone();
        args.push(format!("--standard={}", self.style.standard));
        args.push(format!("--ignore={}", self.ignored.join(",")));
        args.push(format!("--report={}", self.style.report));
        if self.options.ansi {
            args.extend(self.tool.color_args.iter().cloned());
        }

        Invocation::new(self.tool.resolve_program(self.root))
            .args(args)
            .args(files.iter().cloned())
            .cwd(self.root)
    }

    /// Runs the style checker over `files`.
    pub fn run<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        files: &FileSet,
    ) -> Result<(StyleVerdict, StageResult)> {
        let result = run_stage(runner, &self.invocation(files))?;
        let verdict = if result.exit_code == 0 {
            StyleVerdict::Compliant
        } else {
            StyleVerdict::Violations
        };
        tracing::debug!(?verdict, exit_code = result.exit_code, "style stage");
        Ok((verdict, result))
    }
}

/// Runs the fixer and re-stages what it touched.
#[derive(Debug)]
pub struct AutoFixStage<'a> {
    tool: &'a ToolConfig,
    style: &'a StyleConfig,
    repo: &'a GitRepo,
    options: StageOptions,
}

impl<'a> AutoFixStage<'a> {
    /// Creates the stage.
    #[must_use]
    pub const fn new(
        tool: &'a ToolConfig,
        style: &'a StyleConfig,
        repo: &'a GitRepo,
        options: StageOptions,
    ) -> Self {
        Self {
            tool,
            style,
            repo,
            options,
        }
    }

    /// Builds the invocation for `files`.
    #[must_use]
    pub fn invocation(&self, files: &FileSet) -> Invocation {
        let root = self.repo.root();
        Invocation::new(self.tool.resolve_program(root))
            .args(tool_args(self.tool, self.options))
            .args(files.iter().cloned())
            .args([format!("--standard={}", self.style.standard)])
            .cwd(root)
    }

    /// Runs the fixer over `files`; on success every path is re-staged once.
    pub fn run<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        files: &FileSet,
    ) -> Result<(FixVerdict, StageResult)> {
        let result = run_stage(runner, &self.invocation(files))?;

        if !FIXER_SUCCESS_CODES.contains(&result.exit_code) {
            tracing::warn!(exit_code = result.exit_code, "fixer exited with an unexpected code");
            return Ok((FixVerdict::Failed, result));
        }

        self.repo.stage(runner, files)?;
        Ok((FixVerdict::Fixed, result))
    }
}
