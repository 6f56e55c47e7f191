//! Change-set discovery from `git status --short` output.

use crate::core::files::FileSet;
use regex::Regex;
use std::sync::OnceLock;

/// Status code of one `git status --short` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// `M`: modified.
    Modified,
    /// `A`: added.
    Added,
    /// Any other recognised code (currently `AM`).
    Other,
}

impl ChangeStatus {
    /// Returns true if files with this status are checked.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Modified | Self::Added)
    }
}

/// One parsed status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Status code.
    pub status: ChangeStatus,
    /// Path relative to the repository root.
    pub path: String,
}

fn status_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(M|A|AM)\s(.*)$").ok())
        .as_ref()
}

/// Parses a single status line.
///
/// Returns `None` for lines whose leading code is not `M`, `A` or `AM`, and
/// for lines with an empty path.
#[must_use]
pub fn parse_status_line(line: &str) -> Option<ChangeRecord> {
    let captures = status_pattern()?.captures(line.trim())?;

    let status = match captures.get(1)?.as_str() {
        "M" => ChangeStatus::Modified,
        "A" => ChangeStatus::Added,
        _ => ChangeStatus::Other,
    };

    let path = captures.get(2)?.as_str().trim();
    if path.is_empty() {
        return None;
    }

    Some(ChangeRecord {
        status,
        path: path.to_string(),
    })
}

/// Resolves status lines into the set of eligible paths, in input order.
///
/// `AM` (added, then modified in the worktree) is recognised but never
/// eligible.
pub fn resolve<I, S>(lines: I) -> FileSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_status_line(line.as_ref()))
        .filter(|record| record.status.is_eligible())
        .map(|record| record.path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_resolve_mixed_status() {
        let files = resolve(["M src/a.src", "?? src/b.src", "A  src/c.src"]);
        assert_eq!(files.as_slice(), ["src/a.src", "src/c.src"]);
    }

    #[rstest]
    #[case(" M src/a.php", ChangeStatus::Modified, "src/a.php")]
    #[case("M  src/a.php", ChangeStatus::Modified, "src/a.php")]
    #[case("A  app/Models/User.php", ChangeStatus::Added, "app/Models/User.php")]
    #[case("AM src/b.php", ChangeStatus::Other, "src/b.php")]
    #[case("M src/with space.php  ", ChangeStatus::Modified, "src/with space.php")]
    fn test_parse_recognised_lines(
        #[case] line: &str,
        #[case] status: ChangeStatus,
        #[case] path: &str,
    ) {
        let record = parse_status_line(line).expect("line should parse");
        assert_eq!(record.status, status);
        assert_eq!(record.path, path);
    }

    #[rstest]
    #[case("?? src/new.php")]
    #[case("D  src/gone.php")]
    #[case("R  old.php -> new.php")]
    #[case("MM src/both.php")]
    #[case("UU src/conflict.php")]
    #[case("")]
    #[case("M")]
    #[case("M   ")]
    fn test_parse_unrecognised_lines(#[case] line: &str) {
        assert_eq!(parse_status_line(line), None);
    }

    #[test]
    fn test_am_is_dropped() {
        let files = resolve(["AM src/a.php", "A src/b.php"]);
        assert_eq!(files.as_slice(), ["src/b.php"]);
    }

    #[test]
    fn test_only_m_and_a_are_eligible() {
        let lines = [
            "M a.php", "A b.php", "AM c.php", "?? d.php", "D e.php", "MM f.php", "!! g.php",
        ];
        let files = resolve(lines);
        assert_eq!(files.as_slice(), ["a.php", "b.php"]);
    }

    #[test]
    fn test_resolve_deduplicates() {
        let files = resolve(["M a.php", "A a.php", "M b.php"]);
        assert_eq!(files.as_slice(), ["a.php", "b.php"]);
    }

    #[test]
    fn test_resolve_empty() {
        let lines: Vec<String> = Vec::new();
        assert!(resolve(lines).is_empty());
    }
}
