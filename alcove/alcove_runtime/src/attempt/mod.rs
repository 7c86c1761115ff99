//! Attempts: lifecycle, orchestration and reporting.

pub mod lifecycle;
pub mod orchestrator;
pub mod report;

pub use lifecycle::{AttemptLifecycle, AttemptState};
pub use orchestrator::AttemptOrchestrator;
pub use report::{AttemptFailure, AttemptOutcome, AttemptReport};
