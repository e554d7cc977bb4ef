use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A navigable position parsed out of runner output.
///
/// Lines and columns are 1-based, as printed in JavaScript stack traces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Resolve a relative file against the directory the runner was started in.
    pub fn resolve(&self, dir: &Path) -> SourceLocation {
        if self.file.is_absolute() {
            return self.clone();
        }
        SourceLocation {
            file: dir.join(&self.file),
            ..self.clone()
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_clickable_triple() {
        let loc = SourceLocation::new("src/sum.test.ts", 12, 5);
        assert_eq!(loc.to_string(), "src/sum.test.ts:12:5");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let dir = Path::new("/work/app");

        let relative = SourceLocation::new("src/a.js", 1, 2);
        assert_eq!(relative.resolve(dir).file, PathBuf::from("/work/app/src/a.js"));

        let absolute = SourceLocation::new("/elsewhere/b.js", 3, 4);
        assert_eq!(absolute.resolve(dir), absolute);
    }
}
