//! jest-runner - run jest against a file, a project or the test block at the cursor
//!
//! This crate provides functionality to:
//! - Locate the project root (the directory holding `package.json`) for a file
//! - Extract the name of the enclosing `describe` block at a cursor position
//! - Build the shell command line that runs jest with the right filters
//! - Launch that command and turn its stack traces into `file:line:column` locations
pub mod command;
pub mod config;
pub mod error;
pub mod extract;
pub mod navigator;
pub mod project;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use command::{CommandBuilder, ProcessHandle};
pub use config::Config;
pub use extract::{KeywordScanExtractor, NameExtractor};
pub use navigator::{OutputSink, ResultNavigator};
pub use project::{Ascent, ManifestRootLocator, RootLocator};
pub use session::{Action, Session, Target};
pub use store::SessionStore;
