//! Failure banner rendering.
//!
//! The lint-failure message can be dressed up by an external text-art tool.
//! This is purely cosmetic: whatever goes wrong, the plain message is used.

use crate::config::BannerConfig;
use crate::core::executor::{Executor, Invocation, ProcessRunner};

/// Turns a message into the text shown to the user.
pub trait Banner {
    /// Renders `message`.
    fn render(&self, message: &str) -> String;
}

/// Shows the message as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainBanner;

impl Banner for PlainBanner {
    fn render(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Pipes the message through a decorative tool such as `cowsay`.
#[derive(Debug)]
pub struct ExternalBanner<'a, R: ?Sized> {
    config: &'a BannerConfig,
    runner: &'a R,
}

impl<'a, R: ProcessRunner + ?Sized> ExternalBanner<'a, R> {
    /// Creates the banner.
    pub const fn new(config: &'a BannerConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    fn decorate(&self, message: &str) -> Option<String> {
        if cfg!(windows) || !self.config.enabled {
            return None;
        }

        if !Executor::command_exists(&self.config.program) {
            return None;
        }

        let invocation = Invocation::new(&self.config.program)
            .args(self.config.args.iter().cloned())
            .args([message]);

        match self.runner.run(&invocation) {
            Ok(output) if output.success() && !output.stdout.trim().is_empty() => {
                Some(output.stdout.trim_end().to_string())
            },
            Ok(output) => {
                tracing::debug!(exit_code = output.exit_code, "banner tool produced nothing usable");
                None
            },
            Err(e) => {
                tracing::debug!(error = %e, "banner tool failed");
                None
            },
        }
    }
}

impl<R: ProcessRunner + ?Sized> Banner for ExternalBanner<'_, R> {
    fn render(&self, message: &str) -> String {
        self.decorate(message)
            .unwrap_or_else(|| PlainBanner.render(message))
    }
}
