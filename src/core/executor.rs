//! Subprocess execution for pipeline stages.
//!
//! Every tool the gate drives (linter, style checker, fixer, git, banner)
//! goes through [`ProcessRunner`]. The real implementation, [`Executor`],
//! spawns the child with independent stdin/stdout/stderr pipes, streams an
//! optional payload into stdin, closes it, and only then collects output and
//! the exit status.

use crate::core::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// A fully described command to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Lines written to the child's stdin, each followed by a newline.
    pub stdin: Option<Vec<String>>,
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the stdin payload.
    #[must_use]
    pub fn stdin<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stdin = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }

    /// Program name used in messages.
    #[must_use]
    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Output from a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the command. A signal-terminated child reports 1.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Creates an output with the given exit code and stdout.
    pub fn new(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Returns true if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the trimmed stdout split into lines.
    #[must_use]
    pub fn stdout_lines(&self) -> Vec<String> {
        let trimmed = self.stdout.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        trimmed.lines().map(str::to_string).collect()
    }
}

/// Runs external commands.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    /// Runs the invocation to completion.
    ///
    /// Spawn failures are errors; a non-zero exit is a normal output.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runner backed by real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }

    /// Writes the payload then closes stdin by dropping the handle.
    fn feed_stdin(child: &mut Child, lines: &[String]) -> std::io::Result<()> {
        let Some(mut stdin) = child.stdin.take() else {
            return Ok(());
        };

        let mut payload = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            payload.push_str(line);
            payload.push('\n');
        }

        match stdin.write_all(payload.as_bytes()) {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("child closed stdin early");
                Ok(())
            },
            other => other,
        }
    }
}

/// Exit code of a finished child; a signal death reports `128 + signal` like a shell.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

impl ProcessRunner for Executor {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let program = invocation.display_program();
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        if let Some(ref cwd) = invocation.cwd {
            cmd.current_dir(cwd);
        }

        if invocation.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(program = %program, args = ?invocation.args, "spawning");

        let mut child = cmd.spawn().map_err(|e| Error::spawn(program.clone(), e))?;

        if let Some(ref lines) = invocation.stdin {
            if let Err(e) = Self::feed_stdin(&mut child, lines) {
                // Reap before reporting so no zombie is left behind.
                drop(child.kill());
                drop(child.wait());
                return Err(Error::io(format!("write stdin of {program}"), e));
            }
        }

        // stdin is closed at this point; draining cannot deadlock on it.
        let output = child
            .wait_with_output()
            .map_err(|e| Error::io(format!("wait for {program}"), e))?;

        let exit_code = exit_code_of(output.status);
        tracing::debug!(program = %program, exit_code, "finished");

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
