//! On-disk copy of the last invocation, so a fresh process can rerun it.

use crate::{
    error::{Error, Result},
    types::Invocation,
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

const SESSION_FILE: &str = "last-invocation.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredInvocation {
    invocation: Invocation,
    timestamp: SystemTime,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Per-user location of the session file.
    ///
    /// `$XDG_STATE_HOME/jest-runner` (or `~/.local/state/jest-runner`), the
    /// platform's local data dir where there is no state dir, and
    /// `<temp dir>/jest-runner-<uid>` when neither is known.
    pub fn default_path() -> PathBuf {
        let dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("jest-runner"))
            .unwrap_or_else(|| std::env::temp_dir().join(format!("jest-runner-{}", user_tag())));
        dir.join(SESSION_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored invocation, if any.
    ///
    /// Unreadable files count as empty, and so do files another user could
    /// have written: the command in them is handed to a shell.
    pub fn load(&self) -> Result<Option<Invocation>> {
        if !self.path.exists() {
            return Ok(None);
        }
        if let Err(reason) = check_private(&self.path) {
            warn!("Ignoring session file {:?}: {}", self.path, reason);
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<StoredInvocation>(&contents) {
            Ok(stored) => {
                debug!("Loaded last invocation from {:?}", self.path);
                Ok(Some(stored.invocation))
            }
            Err(e) => {
                warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, invocation: &Invocation) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent)?;
            check_private_dir(parent).map_err(|reason| {
                Error::IoError(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("refusing to write session into {}: {reason}", parent.display()),
                ))
            })?;
        }

        let stored = StoredInvocation {
            invocation: invocation.clone(),
            timestamp: SystemTime::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        write_private(&self.path, contents.as_bytes())?;
        debug!("Saved last invocation to {:?}", self.path);
        Ok(())
    }
}

fn check_private(path: &Path) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        check_private_dir(parent).map_err(|reason| format!("{}: {reason}", parent.display()))?;
    }
    let meta = std::fs::symlink_metadata(path).map_err(|e| e.to_string())?;
    check_owner(&meta)
}

fn check_private_dir(dir: &Path) -> std::result::Result<(), String> {
    let meta = std::fs::metadata(dir).map_err(|e| e.to_string())?;
    check_owner(&meta)
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

#[cfg(unix)]
fn user_tag() -> String {
    current_uid().to_string()
}

#[cfg(not(unix))]
fn user_tag() -> String {
    std::env::var("USERNAME").unwrap_or_else(|_| "user".to_string())
}

/// Owned by us and writable by nobody else.
#[cfg(unix)]
fn check_owner(meta: &std::fs::Metadata) -> std::result::Result<(), String> {
    use std::os::unix::fs::MetadataExt;

    let uid = current_uid();
    if meta.uid() != uid {
        return Err(format!("owned by uid {}, not {}", meta.uid(), uid));
    }
    let mode = meta.mode() & 0o777;
    if mode & 0o022 != 0 {
        return Err(format!("mode {mode:o} is group or world writable"));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_owner(_meta: &std::fs::Metadata) -> std::result::Result<(), String> {
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies when the file is created
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    std::fs::write(path, contents)
}
