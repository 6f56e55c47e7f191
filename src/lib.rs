//! # commit-gate
//!
//! A git pre-commit gate for source files.
//!
//! Before each commit, `commit-gate` lints the files you are about to commit,
//! checks them against your coding standard, and lets the fixer correct what
//! it can. Corrected files are re-staged so the commit contains the fixes.
//!
//! ## Features
//!
//! - **Change-set aware**: Only modified and added source files are checked
//! - **Auto-fix**: Style violations are corrected and re-staged automatically
//! - **Whole-tree runs**: Check a directory or the whole repository on demand
//! - **Idempotent install**: `--install` writes the hook once, atomically
//!
//! ## Example
//!
//! ```rust,no_run
//! use commit_gate::core::banner::PlainBanner;
//! use commit_gate::core::executor::Executor;
//! use commit_gate::core::stages::StageOptions;
//! use commit_gate::{Config, GitRepo, Pipeline};
//!
//! fn main() -> commit_gate::Result<()> {
//!     let config = Config::load_or_default()?;
//!     let repo = GitRepo::discover()?;
//!     let runner = Executor::new();
//!
//!     // Modified and added source files
//!     let files = config.source_filter().to_source_files(&repo.changed_files(&runner)?);
//!
//!     let pipeline = Pipeline::new(&config, &repo, &runner, Box::new(PlainBanner), StageOptions::default());
//!     let outcome = pipeline.run(&files)?;
//!
//!     std::process::exit(i32::from(outcome.exit_code()));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/commit-gate/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use config::Config;
pub use core::error::{Error, Result};
pub use core::files::FileSet;
pub use core::git::GitRepo;
pub use core::pipeline::{Pipeline, PipelineOutcome};
