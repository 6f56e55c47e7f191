//! Integration tests for the commit-gate CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git")
        .status;
    assert!(status.success(), "git {args:?} failed");
}

/// Creates a test git repository.
fn create_test_repo() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    git(temp.path(), &["init", "--quiet"]);
    git(temp.path(), &["config", "user.email", "test@test.com"]);
    git(temp.path(), &["config", "user.name", "Test"]);
    temp
}

fn commit_gate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("commit-gate").expect("binary");
    cmd.current_dir(dir).env_remove("COMMIT_GATE_SKIP");
    cmd
}

/// Writes an executable tool script under `bin/`.
#[cfg(unix)]
fn write_tool(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).expect("create bin dir");
    let path = bin.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod tool");
}

/// Points every tool at a script in `bin/` and disables the banner.
fn write_config(dir: &Path) {
    std::fs::write(
        dir.join("commit-gate.toml"),
        r#"
[tools.lint]
program = "bin/lint"

[tools.style]
program = "bin/style"

[tools.fixer]
program = "bin/fixer"

[banner]
enabled = false
"#,
    )
    .expect("write config");
}

/// Stages a source file so it shows up as added.
fn add_source(dir: &Path, path: &str) {
    let file = dir.join(path);
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent).expect("create source dir");
    }
    std::fs::write(&file, "<?php\necho 'hi';\n").expect("write source");
    git(dir, &["add", path]);
}

#[test]
fn test_help() {
    Command::cargo_bin("commit-gate")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pre-commit"));
}

#[test]
fn test_version() {
    Command::cargo_bin("commit-gate")
        .expect("binary")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_skip_env() {
    let temp = TempDir::new().expect("create temp dir");

    commit_gate(temp.path())
        .arg("pre-commit")
        .env("COMMIT_GATE_SKIP", "1")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn test_not_git_repo() {
    let temp = TempDir::new().expect("create temp dir");

    commit_gate(temp.path())
        .arg("pre-commit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a Git repository"));
}

#[test]
fn test_nothing_to_check() {
    let temp = create_test_repo();
    std::fs::write(temp.path().join("notes.txt"), "not source").expect("write file");
    git(temp.path(), &["add", "notes.txt"]);

    commit_gate(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to check!"));
}

#[test]
fn test_missing_path_fails() {
    let temp = create_test_repo();

    commit_gate(temp.path())
        .args(["pre-commit", "--path=does/not/exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_init_creates_config() {
    let temp = create_test_repo();

    commit_gate(temp.path()).arg("init").assert().success();

    let config = std::fs::read_to_string(temp.path().join("commit-gate.toml")).expect("read config");
    assert!(config.contains("parallel-lint"));
}

#[test]
fn test_init_refuses_overwrite() {
    let temp = create_test_repo();
    std::fs::write(temp.path().join("commit-gate.toml"), "# mine\n").expect("write config");

    commit_gate(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let config = std::fs::read_to_string(temp.path().join("commit-gate.toml")).expect("read config");
    assert_eq!(config, "# mine\n");
}

#[cfg(unix)]
#[test]
fn test_install_creates_hook_once() {
    use std::os::unix::fs::PermissionsExt;
    let temp = create_test_repo();
    let hook = temp.path().join(".git").join("hooks").join("pre-commit");

    commit_gate(temp.path())
        .args(["pre-commit", "--install"])
        .assert()
        .success()
        .stderr(predicate::str::contains("successfully installed"));

    let content = std::fs::read_to_string(&hook).expect("read hook");
    assert!(content.starts_with("#!/bin/sh\n"));
    assert!(content.trim_end().ends_with(" pre-commit"));
    let mode = std::fs::metadata(&hook).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);

    commit_gate(temp.path())
        .args(["pre-commit", "--install"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already installed"));

    assert_eq!(std::fs::read_to_string(&hook).expect("read hook"), content);
}

#[cfg(unix)]
#[test]
fn test_clean_run() {
    let temp = create_test_repo();
    write_config(temp.path());
    write_tool(temp.path(), "lint", "cat > /dev/null\nexit 0");
    write_tool(temp.path(), "style", "exit 0");
    write_tool(temp.path(), "fixer", "echo fixer-ran\nexit 0");
    add_source(temp.path(), "src/a.php");

    commit_gate(temp.path())
        .arg("pre-commit")
        .assert()
        .success()
        .stdout(predicate::str::contains("fixer-ran").not())
        .stderr(predicate::str::contains("All done!"));
}

#[cfg(unix)]
#[test]
fn test_lint_failure_blocks_commit() {
    let temp = create_test_repo();
    write_config(temp.path());
    write_tool(temp.path(), "lint", "while read f; do echo \"Parse error: $f\"; done\nexit 255");
    write_tool(temp.path(), "style", "echo style-ran\nexit 0");
    write_tool(temp.path(), "fixer", "exit 0");
    add_source(temp.path(), "src/a.php");

    commit_gate(temp.path())
        .arg("pre-commit")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Parse error: src/a.php"))
        .stdout(predicate::str::contains("style-ran").not())
        .stderr(predicate::str::contains("Commit aborted"));
}

#[cfg(unix)]
#[test]
fn test_quiet_suppresses_reports() {
    let temp = create_test_repo();
    write_config(temp.path());
    write_tool(temp.path(), "lint", "cat > /dev/null\necho 'Parse error'\nexit 1");
    write_tool(temp.path(), "style", "exit 0");
    write_tool(temp.path(), "fixer", "exit 0");
    add_source(temp.path(), "src/a.php");

    commit_gate(temp.path())
        .args(["pre-commit", "--quiet"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Parse error").not());
}

#[cfg(unix)]
#[test]
fn test_style_violation_fixed_and_restaged() {
    let temp = create_test_repo();
    write_config(temp.path());
    write_tool(temp.path(), "lint", "cat > /dev/null\nexit 0");
    write_tool(temp.path(), "style", "echo '--- src/a.php'\nexit 1");
    // Rewrites every file argument, then reports that it fixed something
    write_tool(
        temp.path(),
        "fixer",
        "for f in \"$@\"; do case \"$f\" in --*) ;; *) echo '<?php echo 1;' > \"$f\" ;; esac; done\nexit 1",
    );
    add_source(temp.path(), "src/a.php");

    commit_gate(temp.path())
        .arg("pre-commit")
        .assert()
        .success()
        .stderr(predicate::str::contains("re-staged"));

    // The fixed content is what is staged
    let staged = std::process::Command::new("git")
        .args(["diff", "--cached", "--", "src/a.php"])
        .current_dir(temp.path())
        .output()
        .expect("git diff");
    assert!(String::from_utf8_lossy(&staged.stdout).contains("<?php echo 1;"));

    let unstaged = std::process::Command::new("git")
        .args(["diff", "--name-only"])
        .current_dir(temp.path())
        .output()
        .expect("git diff");
    assert!(!String::from_utf8_lossy(&unstaged.stdout).contains("src/a.php"));
}

#[cfg(unix)]
#[test]
fn test_unfixable_violation_blocks_commit() {
    let temp = create_test_repo();
    write_config(temp.path());
    write_tool(temp.path(), "lint", "cat > /dev/null\nexit 0");
    write_tool(temp.path(), "style", "exit 1");
    write_tool(temp.path(), "fixer", "exit 2");
    add_source(temp.path(), "src/a.php");

    commit_gate(temp.path())
        .arg("pre-commit")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unable to fix violations."));
}

#[cfg(unix)]
#[test]
fn test_all_files_skips_ignored_and_templates() {
    let temp = create_test_repo();
    write_config(temp.path());
    // Prints what it was asked to check
    write_tool(temp.path(), "lint", "while read f; do echo \"checked $f\"; done\nexit 0");
    write_tool(temp.path(), "style", "exit 0");
    write_tool(temp.path(), "fixer", "exit 0");
    for path in ["app/a.php", "app/vendor/lib.php", "app/view.blade.php"] {
        let file = temp.path().join(path);
        std::fs::create_dir_all(file.parent().expect("parent")).expect("create dir");
        std::fs::write(&file, "<?php\n").expect("write source");
    }

    commit_gate(temp.path())
        .args(["pre-commit", "--all-files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checked app/a.php"))
        .stdout(predicate::str::contains("vendor").not())
        .stdout(predicate::str::contains("blade").not());
}
