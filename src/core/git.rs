//! Git repository operations.
//!
//! Repository discovery talks to git directly. Status and staging go through
//! a [`ProcessRunner`] so the pipeline can be exercised without a real index.

use crate::core::changeset;
use crate::core::error::{Error, Result};
use crate::core::executor::{Invocation, ProcessRunner};
use crate::core::files::FileSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the git binary.
pub const GIT: &str = "git";

/// Represents a Git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
    /// Path to the .git directory (or file for worktrees).
    git_dir: PathBuf,
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new(GIT)
            .args(["rev-parse", "--show-toplevel", "--git-dir"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        let root = lines.next().map(PathBuf::from).ok_or(Error::NotGitRepo)?;

        let git_dir = lines
            .next()
            .map(|s| {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    path.join(p)
                }
            })
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root, git_dir })
    }

    /// Repository rooted at `root` without asking git.
    #[cfg(test)]
    pub(crate) fn for_tests(root: PathBuf) -> Self {
        let git_dir = root.join(".git");
        Self { root, git_dir }
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .git directory path.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Returns the hooks directory path.
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        // Check for custom hooks path first
        if let Ok(output) = Command::new(GIT)
            .args(["config", "--get", "core.hooksPath"])
            .current_dir(&self.root)
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    let hooks_path = PathBuf::from(&path);
                    if hooks_path.is_absolute() {
                        return hooks_path;
                    }
                    return self.root.join(hooks_path);
                }
            }
        }

        self.git_dir.join("hooks")
    }

    /// Returns the path to a specific hook.
    #[must_use]
    pub fn hook_path(&self, hook_name: &str) -> PathBuf {
        self.hooks_dir().join(hook_name)
    }

    /// Returns the raw `git status --short` lines.
    pub fn status_lines<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Result<Vec<String>> {
        let invocation = Invocation::new(GIT)
            .args(["status", "--short"])
            .cwd(&self.root);
        let output = runner.run(&invocation)?;

        if !output.success() {
            return Err(Error::git(
                "status --short",
                format!("Unable to run command: {}", output.stderr.trim()),
            ));
        }

        Ok(output.stdout.lines().map(str::to_string).collect())
    }

    /// Returns the modified and added files reported by `git status`.
    pub fn changed_files<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Result<FileSet> {
        let lines = self.status_lines(runner)?;
        Ok(changeset::resolve(&lines))
    }

    /// Stages the given files with a single `git add`.
    pub fn stage<R: ProcessRunner + ?Sized>(&self, runner: &R, files: &FileSet) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let invocation = stage_invocation(&self.root, files);
        let output = runner.run(&invocation)?;

        if !output.success() {
            return Err(Error::git("add", output.stderr.trim().to_string()));
        }

        tracing::debug!(count = files.len(), "re-staged files");
        Ok(())
    }
}

/// Builds `git add -- <paths>` run from `root`.
#[must_use]
pub fn stage_invocation(root: &Path, files: &FileSet) -> Invocation {
    Invocation::new(GIT)
        .args(["add", "--"])
        .args(files.iter().cloned())
        .cwd(root)
}
