use serde::{Deserialize, Serialize};

/// Ordered command-line flags handed to the runner.
///
/// Insertion order is preserved and duplicates are kept, the same way the
/// runner itself would see repeated flags. Composition never mutates the
/// receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(Vec<String>);

impl OptionSet {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(options.into_iter().map(Into::into).collect())
    }

    /// A new set with `-t <name>` appended, restricting the run to matching tests.
    pub fn with_filter(&self, name: &str) -> Self {
        let mut options = self.0.clone();
        options.push("-t".to_string());
        options.push(name.to_string());
        Self(options)
    }

    /// A new set with `extra` appended after the existing flags.
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = self.0.clone();
        options.extend(extra.into_iter().map(Into::into));
        Self(options)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<String>> for OptionSet {
    fn from(options: Vec<String>) -> Self {
        Self(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_filter_leaves_original_untouched() {
        let base = OptionSet::new(["--color"]);
        let filtered = base.with_filter("adds numbers");

        assert_eq!(base.as_slice(), ["--color"]);
        assert_eq!(filtered.as_slice(), ["--color", "-t", "adds numbers"]);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let set = OptionSet::new(["--color", "--ci"]).extended(["--color"]);
        assert_eq!(set.as_slice(), ["--color", "--ci", "--color"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = OptionSet::new(["--color"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["--color"]"#);
    }
}
