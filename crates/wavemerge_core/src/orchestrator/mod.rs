//! Pipeline orchestrator for merge jobs.
//!
//! A job is a fixed sequence of steps, each validating its inputs,
//! doing its work, and recording results in the job state:
//!
//! ```text
//! Pipeline
//!     ├── Step: Validate   (inspect every input)
//!     ├── Step: Plan       (pick the target profile)
//!     ├── Step: Normalize  (convert mismatched inputs)
//!     ├── Step: Merge      (stream payloads, crossfade boundaries)
//!     └── Step: Finalize   (patch sizes, verify, commit)
//! ```
//!
//! Most callers should use [`MergeJob`] rather than assembling a
//! pipeline by hand.

mod job;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use job::{create_merge_pipeline, MergeJob};
pub use pipeline::Pipeline;
pub use step::PipelineStep;
pub use steps::{FinalizeStep, MergeStep, NormalizeStep, PlanStep, ValidateStep};
pub use types::{CancelHandle, Context, FinalizeOutput, JobState, ProgressCallback, StepOutcome};
