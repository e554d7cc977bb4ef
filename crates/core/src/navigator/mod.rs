//! Launching the runner and navigating its output

pub mod pattern;
pub mod sink;

pub use pattern::{JEST_STACK_FRAME, JEST_TAG, LocationPattern};
pub use sink::{MemorySink, NullSink, OutputSink, Stream};

use crate::{
    command::ProcessHandle,
    error::{Error, Result},
    types::{Invocation, SourceLocation},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs invocations, remembers the last one, and turns output into locations.
pub struct ResultNavigator {
    patterns: Arc<Vec<LocationPattern>>,
    sink: Arc<dyn OutputSink>,
    last: Option<Invocation>,
}

impl ResultNavigator {
    /// A navigator that knows the jest stack-frame pattern.
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            patterns: Arc::new(vec![LocationPattern::jest()]),
            sink,
            last: None,
        }
    }

    /// Register an extra location pattern. A pattern with the same tag is
    /// replaced in place; new tags are tried after the existing ones.
    pub fn register_pattern(
        &mut self,
        tag: &str,
        regex: &str,
        file_group: usize,
        line_group: usize,
        col_group: usize,
    ) -> Result<()> {
        let pattern = LocationPattern::new(tag, regex, file_group, line_group, col_group)?;
        let patterns = Arc::make_mut(&mut self.patterns);
        match patterns.iter_mut().find(|p| p.tag() == tag) {
            Some(existing) => *existing = pattern,
            None => patterns.push(pattern),
        }
        debug!("Registered location pattern '{}'", tag);
        Ok(())
    }

    pub fn patterns(&self) -> &[LocationPattern] {
        &self.patterns
    }

    pub fn find_locations(&self, output: &str) -> Vec<SourceLocation> {
        pattern::scan(&self.patterns, output)
    }

    /// Start `invocation` and remember it as the last command.
    pub fn run(&mut self, invocation: Invocation) -> Result<ProcessHandle> {
        let handle = ProcessHandle::spawn(
            invocation.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&self.patterns),
        )?;
        self.last = Some(invocation);
        Ok(handle)
    }

    /// Run the last command again, in the directory it ran in before.
    pub fn rerun(&mut self) -> Result<ProcessHandle> {
        let invocation = self.last.clone().ok_or(Error::NoPriorCommand)?;
        info!("Rerunning: {}", invocation.command);
        self.run(invocation)
    }

    pub fn last_invocation(&self) -> Option<&Invocation> {
        self.last.as_ref()
    }

    /// Seed the last command, e.g. from a previous process's session file.
    pub fn remember(&mut self, invocation: Invocation) {
        self.last = Some(invocation);
    }
}
