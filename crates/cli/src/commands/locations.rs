use anyhow::{Context, Result};
use jest_runner_core::{ResultNavigator, navigator::NullSink};
use std::env;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;
use crate::config::load_config;
use crate::display::format_locations;

pub fn locations_command(file: Option<&Path>, dir: Option<&Path>, global: &GlobalArgs) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());

    let output = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read runner output from stdin")?;
            buf
        }
    };

    let config = load_config(&dir, global)?;
    let mut navigator = ResultNavigator::new(Arc::new(NullSink));
    for pattern in &config.patterns {
        navigator.register_pattern(
            &pattern.tag,
            &pattern.regex,
            pattern.file_group,
            pattern.line_group,
            pattern.col_group,
        )?;
    }

    let locations = navigator.find_locations(&output);
    if global.verbose {
        let resolved: Vec<_> = locations.iter().map(|loc| loc.resolve(&dir)).collect();
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else if !locations.is_empty() {
        println!("{}", format_locations(&locations, &dir));
    }
    Ok(())
}
