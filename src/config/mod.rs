//! Configuration handling for commit-gate.
//!
//! Configuration is read once at startup from `commit-gate.toml` (searched
//! from the current directory upward) and falls back to defaults suited to a
//! PHP project using parallel-lint, phpcs and phpcbf. The loaded value is
//! passed explicitly into the pipeline; nothing reads it ambiently.

use crate::core::error::{Error, Result};
use crate::core::files::{IgnoreList, SourceFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "commit-gate.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File selection settings.
    pub files: FilesConfig,
    /// Coding standard settings shared by the style checker and fixer.
    pub style: StyleConfig,
    /// External tool definitions.
    pub tools: ToolsConfig,
    /// Failure banner settings.
    pub banner: BannerConfig,
}

impl Config {
    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;

        let mut current = cwd.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: cwd.join(CONFIG_FILE_NAME),
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.source_suffix.is_empty() {
            return Err(Error::config_invalid("files.source_suffix", "must not be empty"));
        }

        IgnoreList::new(&self.files.ignored)?;

        for (field, tool) in [
            ("tools.lint", &self.tools.lint),
            ("tools.style", &self.tools.style),
            ("tools.fixer", &self.tools.fixer),
        ] {
            if tool.program.trim().is_empty() {
                return Err(Error::config_invalid(
                    format!("{field}.program"),
                    "must not be empty",
                ));
            }
        }

        if self.banner.enabled && self.banner.program.trim().is_empty() {
            return Err(Error::config_invalid("banner.program", "must not be empty"));
        }

        Ok(())
    }

    /// Source filter built from `[files]`.
    #[must_use]
    pub fn source_filter(&self) -> SourceFilter {
        SourceFilter::new(&self.files.source_suffix, &self.files.template_suffix)
    }

    /// Compiled ignore list built from `[files]`.
    pub fn ignore_list(&self) -> Result<IgnoreList> {
        IgnoreList::new(&self.files.ignored)
    }

    /// Generates default configuration as a string.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| Error::Internal {
            message: format!("Failed to serialize config: {e}"),
        })
    }
}

/// File selection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Suffix identifying source files.
    pub source_suffix: String,
    /// Suffix identifying templates, excluded even though they end in `source_suffix`.
    pub template_suffix: String,
    /// Glob patterns passed to the style checker and applied to directory walks.
    pub ignored: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source_suffix: ".php".to_string(),
            template_suffix: ".blade.php".to_string(),
            ignored: vec![
                "*/database/*".to_string(),
                "*/public/*".to_string(),
                "*/assets/*".to_string(),
                "*/vendor/*".to_string(),
            ],
        }
    }
}

/// Coding standard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Rule-set location, passed as `--standard=`.
    pub standard: String,
    /// Report format, passed as `--report=`.
    pub report: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            standard: "phpcs.xml".to_string(),
            report: "diff".to_string(),
        }
    }
}

/// The three pipeline tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Syntax checker reading paths from stdin.
    pub lint: ToolConfig,
    /// Style checker taking paths as trailing arguments.
    pub style: ToolConfig,
    /// Fixer taking paths as arguments.
    pub fixer: ToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            lint: ToolConfig {
                program: "vendor/bin/parallel-lint".to_string(),
                args: vec!["--stdin".to_string(), "--no-progress".to_string()],
                color_args: vec!["--colors".to_string()],
            },
            style: ToolConfig {
                program: "vendor/bin/phpcs".to_string(),
                args: Vec::new(),
                color_args: vec!["--colors".to_string()],
            },
            fixer: ToolConfig {
                program: "vendor/bin/phpcbf".to_string(),
                args: Vec::new(),
                color_args: Vec::new(),
            },
        }
    }
}

/// One external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program to run. Relative paths containing a separator resolve from the repository root.
    pub program: String,
    /// Arguments placed before any stage-specific arguments.
    pub args: Vec<String>,
    /// Extra arguments added when `--ansi` is given.
    pub color_args: Vec<String>,
}

impl ToolConfig {
    /// Resolves the program against the repository root.
    ///
    /// Bare names (`phpcs`) are left for `PATH` lookup.
    #[must_use]
    pub fn resolve_program(&self, root: &Path) -> PathBuf {
        let program = Path::new(&self.program);
        if program.is_absolute() || program.components().count() <= 1 {
            program.to_path_buf()
        } else {
            root.join(program)
        }
    }
}

/// Failure banner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Whether to try the decorative tool at all.
    pub enabled: bool,
    /// Decorative text tool.
    pub program: String,
    /// Arguments placed before the message.
    pub args: Vec<String>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "cowsay".to_string(),
            args: vec!["-f".to_string(), "unipony-smaller".to_string()],
        }
    }
}
