use anyhow::{Context, Result, bail};
use jest_runner_core::{
    Action, Error, RunState, Session, Target,
    utils::{JsFileKind, detect_file_type, offset_at},
};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::GlobalArgs;
use crate::config::{discovery_start, load_config, session_store};
use crate::display::{TerminalSink, print_invocation, print_locations_summary, print_run_state};
use crate::utils::parse_filepath_with_position;

/// Build the target for an action from the raw command-line argument.
fn resolve_target(
    action: Action,
    filepath_arg: Option<&str>,
    offset: Option<usize>,
    cwd: &Path,
) -> Result<Target> {
    let Some(arg) = filepath_arg else {
        return Ok(Target::default());
    };

    if action != Action::RunAtPoint {
        return Ok(Target::file(arg));
    }

    let (filepath, position) = parse_filepath_with_position(arg);
    if filepath.trim().is_empty() {
        return Err(Error::NoBackingFile.into());
    }
    let path = cwd.join(&filepath);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let offset = match (offset, position) {
        (Some(offset), _) => offset,
        (None, Some(pos)) => offset_at(&text, pos.line, pos.column.unwrap_or(1)),
        (None, None) => bail!(
            "run-at-point needs a cursor: pass FILE:LINE[:COL] or --offset <BYTES>"
        ),
    };
    debug!("Cursor for {} at byte {}", filepath, offset);

    Ok(Target::at(filepath, offset).with_text(text))
}

pub fn run_command(
    action: Action,
    filepath_arg: Option<&str>,
    offset: Option<usize>,
    global: &GlobalArgs,
) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let target = resolve_target(action, filepath_arg, offset, &cwd)?;

    if let Some(file) = &target.file {
        if action == Action::RunCurrentFile && detect_file_type(file) != JsFileKind::TestFile {
            warn!("{} does not look like a jest test file", file.display());
        }
    }

    let config_start: PathBuf = match &target.file {
        Some(file) => discovery_start(&cwd.join(file)),
        None => cwd.clone(),
    };
    let config = load_config(&config_start, global)?;
    let mut session = Session::new(config, &cwd, Arc::new(TerminalSink))?;

    let store = session_store(global);
    if let Some(previous) = store.load()? {
        session.navigator_mut().remember(previous);
    }

    let invocation = session.plan(action, &target)?;
    if global.dry_run {
        print_invocation(&invocation);
        return Ok(());
    }

    let working_dir = invocation.working_dir.clone();
    let mut handle = session
        .navigator_mut()
        .run(invocation)
        .with_context(|| format!("Failed to start runner in {}", working_dir.display()))?;
    if let Err(e) = store.save(handle.invocation()) {
        warn!("Could not remember command in {}: {}", store.path().display(), e);
    }

    let state = handle.wait()?;
    info!("{} finished: {:?}", action, state);
    print_locations_summary(&handle.locations(), &working_dir);
    print_run_state(state);

    if let RunState::Failed { code } = state {
        std::process::exit(code.unwrap_or(1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_target_for_file_keeps_path() {
        let target =
            resolve_target(Action::RunCurrentFile, Some("a.test.js"), None, Path::new("/w"))
                .unwrap();
        assert_eq!(target.file, Some(PathBuf::from("a.test.js")));
        assert!(target.offset.is_none());
    }

    #[test]
    fn test_resolve_target_at_line() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("a.test.js"),
            "describe('x', () => {\n  it('y');\n});\n",
        )
        .unwrap();

        let target =
            resolve_target(Action::RunAtPoint, Some("a.test.js:2:3"), None, temp_dir.path())
                .unwrap();
        assert_eq!(target.file, Some(PathBuf::from("a.test.js")));
        assert_eq!(target.offset, Some(24));
        assert!(target.text.is_some());
    }

    #[test]
    fn test_resolve_target_at_without_file_is_no_backing_file() {
        let temp_dir = TempDir::new().unwrap();
        for arg in ["", ":3:1"] {
            let err = resolve_target(Action::RunAtPoint, Some(arg), None, temp_dir.path())
                .unwrap_err();
            assert!(
                matches!(err.downcast_ref::<Error>(), Some(Error::NoBackingFile)),
                "{arg:?}: {err:#}"
            );
        }
    }

    #[test]
    fn test_resolve_target_at_requires_cursor() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.test.js"), "").unwrap();

        let err = resolve_target(Action::RunAtPoint, Some("a.test.js"), None, temp_dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("needs a cursor"));
    }
}
