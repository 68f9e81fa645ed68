/*
[INPUT]:  Caller-supplied step definitions
[OUTPUT]: Immutable task descriptions consumed by the runner
[POS]:    Task domain model
[UPDATE]: When a step needs new behavioral attributes
*/

use serde::{Deserialize, Serialize};

/// One step of a verification/sync sequence.
///
/// `action` selects the remote behavior, `message` is display-only, and
/// `extract` optionally names the extraction strategy whose result is
/// remembered for later steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub action: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
}

impl Task {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            extract: None,
        }
    }

    pub fn with_extract(mut self, strategy: impl Into<String>) -> Self {
        self.extract = Some(strategy.into());
        self
    }
}

/// The ordered, fixed list of tasks for one run. Insertion order is the
/// execution order.
pub type TaskSequence = Vec<Task>;
