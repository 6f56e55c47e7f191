//! Main entry point for the `commit-gate` CLI.

use commit_gate::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if !e.is_user_error() {
                eprintln!("  Run with --verbose for details.");
            }
            ExitCode::FAILURE
        }
    }
}
