pub mod formatter;
pub mod terminal;

pub use formatter::{format_locations, print_invocation, print_locations_summary, print_run_state};
pub use terminal::TerminalSink;
