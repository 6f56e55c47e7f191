//! Core functionality for commit-gate.
//!
//! This module contains the main components:
//! - [`changeset`]: Parsing `git status --short` into eligible paths
//! - [`files`]: File sets, source filtering and directory walks
//! - [`executor`]: Running external tools
//! - [`stages`]: Lint, style check and auto-fix stages
//! - [`pipeline`]: Sequencing the stages into an outcome
//! - [`hooks`]: Installing the pre-commit hook
//! - [`git`]: Git repository operations
//! - [`error`]: Error types and result handling

pub mod banner;
pub mod changeset;
pub mod error;
pub mod executor;
pub mod files;
pub mod git;
pub mod hooks;
pub mod pipeline;
pub mod stages;
