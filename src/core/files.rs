//! File sets and source-file selection.
//!
//! A [`FileSet`] is the unit handed from the CLI to the pipeline. It is built
//! either from the change set or from a filesystem walk, and narrowed with
//! [`SourceFilter`] and [`IgnoreList`]. Narrowing always produces a new set.

use crate::core::error::{Error, Result};
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ordered set of unique paths relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<String>,
}

impl FileSet {
    /// Creates an empty file set.
    #[must_use]
    pub const fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// Returns true if there is nothing to check.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Paths in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }

    /// Iterates over the paths.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.paths.iter()
    }

    /// Returns a new set with only the paths matching `keep`.
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            paths: self.paths.iter().filter(|p| keep(p)).cloned().collect(),
        }
    }

    /// Returns a new set without paths matched by the ignore list.
    ///
    /// Patterns are matched against `root.join(path)`.
    #[must_use]
    pub fn without_ignored(&self, root: &Path, ignore: &IgnoreList) -> Self {
        self.filter(|p| !ignore.is_ignored(&root.join(p)))
    }
}

impl FromIterator<String> for FileSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut seen = HashSet::new();
        let paths = iter
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        Self { paths }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Decides which paths are source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    source_suffix: String,
    template_suffix: String,
}

impl SourceFilter {
    /// Creates a filter for paths ending in `source_suffix` but not `template_suffix`.
    pub fn new(source_suffix: impl Into<String>, template_suffix: impl Into<String>) -> Self {
        Self {
            source_suffix: source_suffix.into(),
            template_suffix: template_suffix.into(),
        }
    }

    /// Returns true if `path` is a non-template source file.
    #[must_use]
    pub fn is_source(&self, path: &str) -> bool {
        path.ends_with(&self.source_suffix)
            && (self.template_suffix.is_empty() || !path.ends_with(&self.template_suffix))
    }

    /// Keeps only source files, preserving order.
    #[must_use]
    pub fn to_source_files(&self, files: &FileSet) -> FileSet {
        files.filter(|p| self.is_source(p))
    }
}

/// Compiled ignore globs such as `*/vendor/*`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    patterns: Vec<Pattern>,
}

impl IgnoreList {
    /// Compiles the patterns, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    Error::config_invalid("files.ignored", format!("{}: {e}", p.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if any pattern matches the path.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.patterns.iter().any(|p| p.matches(&path))
    }
}

/// Forward-slash rendering of a path.
fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Collects every source file under `root/dir`.
///
/// The `.git` directory is never entered. Results are relative to `root`,
/// sorted by file name within each directory.
pub fn walk(root: &Path, dir: &Path, filter: &SourceFilter, ignore: &IgnoreList) -> Result<FileSet> {
    let start: PathBuf = root.join(dir);
    if !start.exists() {
        return Err(Error::PathNotFound { path: start });
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(&start)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| {
            let message = format!("walk {}", start.display());
            Error::io(message, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let absolute = entry.path();
        let Ok(relative) = absolute.strip_prefix(root) else {
            continue;
        };

        let relative = normalize(relative);
        if filter.is_source(&relative) {
            paths.push(relative);
        }
    }

    let files = paths.into_iter().collect::<FileSet>().without_ignored(root, ignore);
    tracing::debug!(count = files.len(), dir = %start.display(), "walked source files");
    Ok(files)
}
