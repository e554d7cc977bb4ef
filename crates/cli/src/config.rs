use anyhow::{Context, Result};
use jest_runner_core::{Config, OptionSet, SessionStore};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::GlobalArgs;

/// Config discovered from `start`, with command-line overrides applied.
pub fn load_config(start: &Path, global: &GlobalArgs) -> Result<Config> {
    let mut config = Config::discover(start)
        .with_context(|| format!("Failed to load configuration for {}", start.display()))?;

    if let Some(command) = &global.runner_command {
        debug!("Overriding runner command: {}", command);
        config.command = command.clone();
    }
    if !global.options.is_empty() {
        debug!("Overriding runner options: {:?}", global.options);
        config.options = OptionSet::new(global.options.iter().cloned());
    }

    config.validate()?;
    Ok(config)
}

pub fn session_store(global: &GlobalArgs) -> SessionStore {
    SessionStore::new(
        global
            .session_file
            .clone()
            .unwrap_or_else(SessionStore::default_path),
    )
}

/// Directory config discovery starts from for a target path.
pub fn discovery_start(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
