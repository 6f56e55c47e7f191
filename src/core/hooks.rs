//! Pre-commit hook installation.
//!
//! The hook is a two-line shell script that re-invokes this executable.
//! Installing is idempotent: an identical hook is left alone, a different one
//! is only replaced after confirmation, and the new content reaches the
//! target through an atomic rename of a fully written, executable temp file.

use crate::core::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the hook file inside the hooks directory.
pub const HOOK_NAME: &str = "pre-commit";

/// Permission bits of an installed hook.
#[cfg(unix)]
const HOOK_MODE: u32 = 0o755;

/// Desired hook script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookScript {
    content: String,
}

impl HookScript {
    /// Builds the script that runs `executable signature` on every commit.
    #[must_use]
    pub fn for_command(executable: &Path, signature: &str) -> Self {
        let executable = executable.to_string_lossy().replace('\\', "/");
        Self {
            content: format!("#!/bin/sh\n{} {signature}\n", shell_quote(&executable)),
        }
    }

    /// Script text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Why installation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The existing hook already has the desired content.
    AlreadyInstalled,
    /// The user declined to overwrite a different hook.
    Declined,
}

/// Result of [`install`].
#[derive(Debug)]
pub enum InstallResult {
    /// No hook existed; one was written.
    Installed,
    /// A different hook was replaced.
    Overwritten,
    /// Nothing was written.
    Skipped(SkipReason),
    /// Writing or marking the hook executable failed; the target is unchanged.
    Failed(Error),
}

impl InstallResult {
    /// Returns true unless installation failed.
    #[must_use]
    pub const fn success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Returns the answer, falling back to `default` when nobody can answer.
    fn confirm(&self, prompt: &str, default: bool) -> bool;
}

/// Prompts on the terminal with dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str, default: bool) -> bool {
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!(error = %e, default, "no interactive terminal, using default answer");
                default
            },
        }
    }
}

fn digest(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

/// Installs `script` at `target`.
pub fn install(target: &Path, script: &HookScript, confirm: &dyn Confirm) -> InstallResult {
    let overwriting = match std::fs::read(target) {
        Ok(existing) => {
            if digest(&existing) == digest(script.content().as_bytes()) {
                tracing::debug!(path = %target.display(), "hook already up to date");
                return InstallResult::Skipped(SkipReason::AlreadyInstalled);
            }

            let prompt = format!(
                "{} already exists, do you want to overwrite it?",
                target.display()
            );
            if !confirm.confirm(&prompt, true) {
                return InstallResult::Skipped(SkipReason::Declined);
            }
            true
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return InstallResult::Failed(Error::io("read existing hook", e)),
    };

    match write_hook(target, script) {
        Ok(()) if overwriting => InstallResult::Overwritten,
        Ok(()) => InstallResult::Installed,
        Err(e) => InstallResult::Failed(e),
    }
}

/// Writes content, marks it executable, then renames it over `target`.
fn write_hook(target: &Path, script: &HookScript) -> Result<()> {
    let dir: PathBuf = target
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| Error::io("create hooks dir", e))?;
    }

    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::io("create temp hook", e))?;

    file.write_all(script.content().as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| Error::HookInstall {
            message: format!("write {}: {e}", target.display()),
        })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(HOOK_MODE))
            .map_err(|e| Error::HookInstall {
                message: format!("set permissions on {}: {e}", target.display()),
            })?;
    }

    file.persist(target).map_err(|e| Error::HookInstall {
        message: format!("replace {}: {}", target.display(), e.error),
    })?;

    Ok(())
}
