//! Line diffs of `Debug` renderings, for logs and test failures.

/// Render the line-level changes between two pretty-printed values.
///
/// Removed lines are prefixed with `-`, added lines with `+`, and unchanged
/// lines with two spaces.
pub(crate) fn line_diff(before: &str, after: &str) -> String {
    let mut out = String::new();
    for change in diff::lines(before, after) {
        let (marker, line) = match change {
            diff::Result::Left(line) => ('-', line),
            diff::Result::Right(line) => ('+', line),
            diff::Result::Both(line, _) => (' ', line),
        };
        out.push(marker);
        out.push(' ');
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_removed_and_added_lines() {
        let before = "Counter {\n    count: 1,\n}";
        let after = "Counter {\n    count: 2,\n}";
        assert_eq!(
            line_diff(before, after),
            "  Counter {\n-     count: 1,\n+     count: 2,\n  }\n"
        );
    }

    #[test]
    fn identical_inputs_have_no_markers() {
        let out = line_diff("a\nb", "a\nb");
        assert!(!out.contains('-'));
        assert!(!out.contains('+'));
    }
}
