use crate::{
    error::{Error, Result},
    extract::DEFAULT_BLOCK_KEYWORD,
    project::{Ascent, DEFAULT_MANIFEST},
    types::OptionSet,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names looked for, in order, in every directory on the way up.
pub const CONFIG_FILE_NAMES: &[&str] = &[".jest-runner.json", "jest-runner.json"];

pub const DEFAULT_COMMAND: &str = "npx jest";

fn default_command() -> String {
    DEFAULT_COMMAND.to_string()
}

fn default_options() -> OptionSet {
    OptionSet::new(["--color"])
}

fn default_block_keyword() -> String {
    DEFAULT_BLOCK_KEYWORD.to_string()
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST.to_string()
}

fn default_true() -> bool {
    true
}

/// An extra output pattern registered with the navigator at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub tag: String,
    pub regex: String,
    pub file_group: usize,
    pub line_group: usize,
    pub col_group: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Config {
    /// Runner invocation, used verbatim at the head of every command line
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra flags passed before the target
    #[serde(default = "default_options")]
    pub options: OptionSet,
    #[serde(default = "default_block_keyword")]
    pub block_keyword: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default)]
    pub ascent: Ascent,
    #[serde(default = "default_true")]
    pub escape_target: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: default_command(),
            options: default_options(),
            block_keyword: default_block_keyword(),
            manifest: default_manifest(),
            ascent: Ascent::default(),
            escape_target: true,
            patterns: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Nearest config at or above `start_path`, or the defaults.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                debug!("Loading config from {:?}", path);
                Self::load_from_file(&path)
            }
            None => {
                debug!("No config found from {:?}, using defaults", start_path);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(Error::ConfigError("'command' must not be empty".into()));
        }
        if self.block_keyword.trim().is_empty() {
            return Err(Error::ConfigError(
                "'block_keyword' must not be empty".into(),
            ));
        }
        if self.manifest.trim().is_empty() {
            return Err(Error::ConfigError("'manifest' must not be empty".into()));
        }
        Ok(())
    }
}
