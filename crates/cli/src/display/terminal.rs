use jest_runner_core::navigator::{OutputSink, Stream};
use std::io::Write;

/// Echoes runner output to this process's stdout/stderr as it arrives.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn write_line(&self, stream: Stream, line: &str) {
        // A closed pipe on our side must not take the run down with it
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }
}
