use crate::error::{Error, Result};
use crate::types::SourceLocation;
use regex::Regex;
use std::sync::LazyLock;

/// Tag of the pattern every navigator starts with.
pub const JEST_TAG: &str = "jest";

/// Matches a stack frame such as
/// `at addSpecsToSuite (node_modules/jest-jasmine2/build/jasmine/Env.js:522:17)`.
pub const JEST_STACK_FRAME: &str = r"at \S+ \((.+?):(\d+):(\d+)";

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("static ANSI regex is valid")
});

/// A named regex that pulls `(file, line, column)` out of one line of output.
#[derive(Debug, Clone)]
pub struct LocationPattern {
    tag: String,
    regex: Regex,
    file_group: usize,
    line_group: usize,
    col_group: usize,
}

impl LocationPattern {
    pub fn new(
        tag: &str,
        regex: &str,
        file_group: usize,
        line_group: usize,
        col_group: usize,
    ) -> Result<Self> {
        let compiled = Regex::new(regex)
            .map_err(|e| Error::InvalidPattern(format!("{tag}: {e}")))?;

        // captures_len counts the implicit whole-match group 0
        let groups = compiled.captures_len() - 1;
        for (name, index) in [
            ("file", file_group),
            ("line", line_group),
            ("column", col_group),
        ] {
            if index == 0 || index > groups {
                return Err(Error::InvalidPattern(format!(
                    "{tag}: {name} group {index} out of range (pattern has {groups} groups)"
                )));
            }
        }

        Ok(Self {
            tag: tag.to_string(),
            regex: compiled,
            file_group,
            line_group,
            col_group,
        })
    }

    pub fn jest() -> Self {
        Self::new(JEST_TAG, JEST_STACK_FRAME, 1, 2, 3)
            .expect("built-in jest pattern is valid")
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Location on `line`, if the pattern matches and the numbers are usable.
    pub fn match_line(&self, line: &str) -> Option<SourceLocation> {
        let caps = self.regex.captures(line)?;
        let file = caps.get(self.file_group)?.as_str();
        let line_no: u32 = caps.get(self.line_group)?.as_str().parse().ok()?;
        let column: u32 = caps.get(self.col_group)?.as_str().parse().ok()?;
        if file.is_empty() || line_no == 0 || column == 0 {
            return None;
        }
        Some(SourceLocation::new(file, line_no, column))
    }
}

/// Remove terminal colour sequences so patterns see plain text.
pub fn strip_ansi(text: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Every location in `text`, in order of appearance. On each line the first
/// pattern that matches wins.
pub fn scan(patterns: &[LocationPattern], text: &str) -> Vec<SourceLocation> {
    let plain = strip_ansi(text);
    plain
        .lines()
        .filter_map(|line| patterns.iter().find_map(|p| p.match_line(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_jest_stack_frame() {
        let pattern = LocationPattern::jest();
        let loc = pattern
            .match_line(
                "    at addSpecsToSuite (node_modules/jest-jasmine2/build/jasmine/Env.js:522:17)",
            )
            .unwrap();
        assert_eq!(
            loc.file,
            PathBuf::from("node_modules/jest-jasmine2/build/jasmine/Env.js")
        );
        assert_eq!(loc.line, 522);
        assert_eq!(loc.column, 17);
    }

    #[test]
    fn test_frames_without_position_are_ignored() {
        let pattern = LocationPattern::jest();
        assert!(pattern.match_line("    at new Promise (<anonymous>)").is_none());
        assert!(pattern.match_line("  ● adds numbers › adds 1 + 2").is_none());
        assert!(pattern.match_line("    at Object.<anonymous> (src/a.js:0:4)").is_none());
    }

    #[test]
    fn test_windows_drive_letter_in_file() {
        let pattern = LocationPattern::jest();
        let loc = pattern
            .match_line(r"    at Object.<anonymous> (C:\app\sum.test.js:4:17)")
            .unwrap();
        assert_eq!(loc.file, PathBuf::from(r"C:\app\sum.test.js"));
        assert_eq!((loc.line, loc.column), (4, 17));
    }

    #[test]
    fn test_group_indices_validated() {
        let err = LocationPattern::new("tsc", r"(.+)\((\d+),(\d+)\)", 1, 2, 4).unwrap_err();
        assert!(err.to_string().contains("column group 4 out of range"));

        let err = LocationPattern::new("bad", r"(", 1, 1, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }

    #[test]
    fn test_scan_strips_colour_codes() {
        let text = "\x1b[2mat Object.<anonymous> (\x1b[22m\x1b[2m\x1b[0m\x1b[36msrc/sum.test.js\x1b[39m\x1b[0m\x1b[2m:4:17)\x1b[22m\n";
        let found = scan(&[LocationPattern::jest()], text);
        assert_eq!(found, vec![SourceLocation::new("src/sum.test.js", 4, 17)]);
    }
}
