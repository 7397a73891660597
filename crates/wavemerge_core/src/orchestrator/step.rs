//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use crate::errors::MergeError;
use crate::models::JobPhase;

use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - check preconditions before execution
/// 2. `execute` - perform the step's work
/// 3. `validate_output` - verify the step produced valid output
pub trait PipelineStep: Send + Sync {
    /// Step name, for logging and error context.
    fn name(&self) -> &str;

    /// The job phase this step represents.
    fn phase(&self) -> JobPhase;

    /// Validate preconditions before execution.
    fn validate_input(&self, ctx: &Context, state: &JobState) -> Result<(), MergeError>;

    /// Execute the step's main work, recording results in `state`.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError>;

    /// Verify the step recorded valid output. Called after `execute`
    /// returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> Result<(), MergeError>;
}
