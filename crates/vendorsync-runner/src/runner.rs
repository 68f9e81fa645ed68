/*
[INPUT]:  TaskSequence + ActionDispatcher gateway, pacing interval, CancellationToken
[OUTPUT]: One verification run executed step-by-step with published snapshots
[POS]:    Execution layer - sequential dependent-task runner
[UPDATE]: When changing step classification, pacing, or cancellation semantics
*/

use crate::extract::ExtractorRegistry;
use crate::state::{RunPhase, RunSnapshot, RunState, StepOutcome};
use crate::task::{Task, TaskSequence};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vendorsync_gateway::{ActionDispatcher, ActionRequest};

/// Executes a fixed, ordered sequence of remote calls, one at a time.
///
/// Each call may depend on values extracted from earlier responses; the
/// first failure stops the run. At most one run is active per instance;
/// `start` while a run is in progress is a silent no-op.
pub struct TaskRunner<G> {
    gateway: G,
    interval: Duration,
    fixed_params: BTreeMap<String, Value>,
    extractors: ExtractorRegistry,
    active: AtomicBool,
    snapshot_tx: watch::Sender<RunSnapshot>,
}

impl<G: ActionDispatcher> TaskRunner<G> {
    pub fn new(gateway: G, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(RunSnapshot::default());
        Self {
            gateway,
            interval,
            fixed_params: BTreeMap::new(),
            extractors: ExtractorRegistry::default(),
            active: AtomicBool::new(false),
            snapshot_tx,
        }
    }

    /// Fixed parameters merged into every dispatch of every run
    pub fn with_fixed_params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.fixed_params = params;
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    /// Observe run snapshots; a new value is published after every
    /// step transition.
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Run the sequence to a terminal phase.
    ///
    /// Returns the terminal phase of the run, or the current phase unchanged
    /// when another run is already active (callers that need to know whether
    /// the call was accepted check the returned phase).
    pub async fn start(&self, sequence: &TaskSequence, shutdown: CancellationToken) -> RunPhase {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let phase = self.snapshot_tx.borrow().phase;
            tracing::debug!(?phase, "run already in progress; start ignored");
            return phase;
        }

        let phase = self.run(sequence, shutdown).await;
        self.active.store(false, Ordering::Release);
        phase
    }

    async fn run(&self, sequence: &TaskSequence, shutdown: CancellationToken) -> RunPhase {
        let run_id = Uuid::new_v4();
        let mut state = RunState::new();

        if sequence.is_empty() {
            state.complete_empty();
            self.publish(&state);
            tracing::info!(%run_id, "empty sequence; run succeeded with no steps");
            return state.phase();
        }

        tracing::info!(%run_id, steps = sequence.len(), "run started");

        // Fresh state is observable before the first step starts.
        self.publish(&state);

        for task in sequence {
            state.begin_step(task);
            self.publish(&state);
            tracing::info!(
                action = %task.action,
                step = state.cursor(),
                message = %task.message,
                "step started"
            );

            // Pacing: the configured delay elapses before every dispatch,
            // including the very first one.
            tokio::select! {
                _ = shutdown.cancelled() => return self.cancel(&mut state),
                _ = tokio::time::sleep(self.interval) => {}
            }

            let request = self.build_request(task, &state);
            let response = tokio::select! {
                _ = shutdown.cancelled() => return self.cancel(&mut state),
                response = self.gateway.dispatch(&request) => response,
            };

            let outcome = match response {
                Ok(body) => self.classify(task, &body),
                Err(err) => {
                    tracing::warn!(action = %task.action, error = %err, "dispatch failed");
                    StepOutcome::Failed
                }
            };

            let failed = outcome == StepOutcome::Failed;
            state.finish_step(outcome, sequence.len());
            self.publish(&state);

            if failed {
                tracing::warn!(
                    action = %task.action,
                    step = state.cursor(),
                    "step failed; run aborted"
                );
                return state.phase();
            }
            tracing::info!(action = %task.action, step = state.cursor(), "step succeeded");
        }

        tracing::info!(%run_id, steps = state.steps().len(), "run succeeded");
        state.phase()
    }

    fn cancel(&self, state: &mut RunState) -> RunPhase {
        state.cancel();
        self.publish(state);
        tracing::info!(step = state.cursor(), "run cancelled");
        state.phase()
    }

    /// Action plus fixed params plus accumulated values; accumulated
    /// values win on a key collision with fixed parameters.
    fn build_request(&self, task: &Task, state: &RunState) -> ActionRequest {
        ActionRequest::new(task.action.clone())
            .merge(self.fixed_params.clone())
            .merge(
                state
                    .accumulated()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone())),
            )
    }

    fn classify(&self, task: &Task, body: &Value) -> StepOutcome {
        let Some(strategy) = task.extract.as_deref() else {
            // Generic validation: a top-level `success` boolean.
            return if body.get("success").and_then(Value::as_bool).unwrap_or(false) {
                StepOutcome::Success { extracted: None }
            } else {
                tracing::warn!(action = %task.action, "response lacks success=true");
                StepOutcome::Failed
            };
        };

        let Some(extractor) = self.extractors.get(strategy) else {
            tracing::warn!(action = %task.action, strategy, "unknown extraction strategy");
            return StepOutcome::Failed;
        };

        match extractor(body) {
            Some(value) => {
                tracing::debug!(action = %task.action, strategy, %value, "value extracted");
                StepOutcome::Success {
                    extracted: Some((strategy.to_string(), value)),
                }
            }
            None => {
                tracing::warn!(action = %task.action, strategy, "extraction target missing");
                StepOutcome::Failed
            }
        }
    }

    fn publish(&self, state: &RunState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }
}
