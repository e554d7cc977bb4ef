//! Test block name extraction at a cursor position

use crate::error::{Error, Result};
use crate::utils::text::floor_char_boundary;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_BLOCK_KEYWORD: &str = "describe";

/// Strategy for finding the name of the test block enclosing a cursor.
pub trait NameExtractor: Send + Sync {
    fn extract_at(&self, text: &str, offset: usize) -> Option<String>;

    /// Keyword reported to the user when nothing is found.
    fn keyword(&self) -> &str;
}

/// Line-based backward scan for `<keyword>(<label>, ...`.
///
/// This is a text heuristic, not a parser. The label is the text between the
/// opening parenthesis and the first comma with its first and last characters
/// removed, whatever they are. Labels containing a comma, escaped quotes, or
/// non-literal arguments such as template strings with interpolation come out
/// wrong.
#[derive(Debug, Clone)]
pub struct KeywordScanExtractor {
    keyword: String,
    label: Regex,
}

impl KeywordScanExtractor {
    pub fn new(keyword: &str) -> Result<Self> {
        if keyword.trim().is_empty() {
            return Err(Error::ConfigError("block keyword must not be empty".into()));
        }
        let label = Regex::new(&format!(r"{}\((.*?),", regex::escape(keyword)))
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Self {
            keyword: keyword.to_string(),
            label,
        })
    }

    pub fn describe() -> Result<Self> {
        Self::new(DEFAULT_BLOCK_KEYWORD)
    }

    fn label_from_line(&self, line: &str) -> Option<String> {
        let captured = self.label.captures(line)?.get(1)?.as_str();
        let mut chars = captured.chars();
        chars.next();
        chars.next_back();
        let label = chars.as_str();
        if label.is_empty() {
            None
        } else {
            Some(label.to_string())
        }
    }
}

impl NameExtractor for KeywordScanExtractor {
    fn extract_at(&self, text: &str, offset: usize) -> Option<String> {
        let offset = floor_char_boundary(text, offset);
        let line_end = text[offset..]
            .find('\n')
            .map(|pos| offset + pos)
            .unwrap_or(text.len());

        let line = text[..line_end]
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with(self.keyword.as_str()))?;

        debug!("Nearest '{}' line: {:?}", self.keyword, line);
        self.label_from_line(line)
    }

    fn keyword(&self) -> &str {
        &self.keyword
    }
}
