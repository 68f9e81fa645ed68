/*
[INPUT]:  Public API exports for vendorsync-runner crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod extract;
pub mod poller;
pub mod runner;
pub mod state;
pub mod task;

// Re-export main types for convenience
pub use config::RunnerConfig;
pub use extract::ExtractorRegistry;
pub use poller::{PollSnapshot, PollerHandle, StatusPoller};
pub use runner::TaskRunner;
pub use state::{RunPhase, RunSnapshot, StepResult, StepStatus};
pub use task::{Task, TaskSequence};
