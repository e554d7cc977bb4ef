//! Jest command line generation and execution

pub mod builder;
pub mod process;

// Re-export commonly used types
pub use builder::{CommandBuilder, shell_escape};
pub use process::ProcessHandle;
