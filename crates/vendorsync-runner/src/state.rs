/*
[INPUT]:  Step outcomes produced by the runner
[OUTPUT]: Validated run-state transitions and observable snapshots
[POS]:    Run domain logic - state machine for one verification run
[UPDATE]: When run phases or step bookkeeping need refinement
*/

use crate::task::Task;
use serde_json::Value;
use std::collections::BTreeMap;

/// Status of one started step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Success,
    Failed,
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunPhase {
    /// True once the run can no longer transition
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Succeeded | RunPhase::Failed | RunPhase::Cancelled
        )
    }
}

/// One entry per started task; tasks not yet reached have no entry
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub task: Task,
    pub status: StepStatus,
}

/// How a step ended, as classified by the runner
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Success { extracted: Option<(String, Value)> },
    Failed,
}

/// Immutable projection of a run published after every transition
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub steps: Vec<StepResult>,
    pub phase: RunPhase,
}

impl Default for RunSnapshot {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            phase: RunPhase::Idle,
        }
    }
}

/// Mutable state of one run, owned exclusively by the runner.
///
/// Invariants: `cursor <= started step count <= cursor + 1`, `accumulated`
/// only grows, `steps` is append-only.
#[derive(Debug, Clone)]
pub struct RunState {
    cursor: usize,
    accumulated: BTreeMap<String, Value>,
    steps: Vec<StepResult>,
    phase: RunPhase,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            accumulated: BTreeMap::new(),
            steps: Vec::new(),
            phase: RunPhase::Idle,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn accumulated(&self) -> &BTreeMap<String, Value> {
        &self.accumulated
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            steps: self.steps.clone(),
            phase: self.phase,
        }
    }

    /// An empty sequence succeeds immediately with no steps
    pub fn complete_empty(&mut self) {
        debug_assert!(self.steps.is_empty());
        self.phase = RunPhase::Succeeded;
    }

    /// Record the task at the cursor as started
    pub fn begin_step(&mut self, task: &Task) {
        debug_assert!(!self.phase.is_terminal());
        debug_assert_eq!(self.steps.len(), self.cursor);

        self.steps.push(StepResult {
            task: task.clone(),
            status: StepStatus::Running,
        });
        self.phase = RunPhase::InProgress;
    }

    /// Record the outcome of the step begun last.
    ///
    /// On success the cursor advances and any extracted value joins the
    /// accumulated parameters; reaching `total` completes the run. Any
    /// failure is terminal.
    pub fn finish_step(&mut self, outcome: StepOutcome, total: usize) {
        debug_assert_eq!(self.steps.len(), self.cursor + 1);

        let Some(step) = self.steps.last_mut() else {
            debug_assert!(false, "finish_step called with no started step");
            return;
        };

        match outcome {
            StepOutcome::Success { extracted } => {
                step.status = StepStatus::Success;
                if let Some((key, value)) = extracted {
                    self.accumulated.insert(key, value);
                }
                self.cursor += 1;
                self.phase = if self.cursor == total {
                    RunPhase::Succeeded
                } else {
                    RunPhase::InProgress
                };
            }
            StepOutcome::Failed => {
                step.status = StepStatus::Failed;
                self.phase = RunPhase::Failed;
            }
        }
    }

    /// Cooperative cancellation. The step in flight, if any, keeps its
    /// Running status in the final snapshot.
    pub fn cancel(&mut self) {
        self.phase = RunPhase::Cancelled;
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
