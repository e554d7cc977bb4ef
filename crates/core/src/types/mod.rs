pub mod invocation;
pub mod location;
pub mod options;
pub mod run_state;

// Re-export commonly used types
pub use invocation::{CommandLine, Invocation};
pub use location::SourceLocation;
pub use options::OptionSet;
pub use run_state::RunState;
