use serde::Serialize;

/// Lifecycle of one runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    /// `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Failed { .. } | RunState::Cancelled
        )
    }
}
