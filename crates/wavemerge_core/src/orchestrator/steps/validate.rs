//! Validate step: inspect every input and reject the job if any fails.

use crate::errors::MergeError;
use crate::inspector;
use crate::models::{JobPhase, ValidationResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Parses each input's container and records a per-input result.
///
/// All inputs are inspected even after the first failure, so the error
/// reports every bad input at once.
pub struct ValidateStep;

impl ValidateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ValidateStep {
    fn name(&self) -> &str {
        "Validate"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Validating
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> Result<(), MergeError> {
        if ctx.inputs.is_empty() {
            return Err(MergeError::ValidationFailed { failures: vec![] });
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError> {
        ctx.logger
            .info(&format!("Validating {} input(s)", ctx.inputs.len()));

        let mut results = Vec::with_capacity(ctx.inputs.len());
        let mut failures = Vec::new();
        for input in &ctx.inputs {
            match inspector::inspect_file(input) {
                Ok(descriptor) => {
                    ctx.logger.validation(&format!(
                        "{}: {}, {:.3}s",
                        input.display(),
                        descriptor.profile(),
                        descriptor.duration_secs()
                    ));
                    results.push(ValidationResult::valid(input, descriptor));
                }
                Err(err) => {
                    let err = MergeError::from_inspect(input, err);
                    ctx.logger.validation(&format!("REJECTED: {}", err));
                    results.push(ValidationResult::invalid(input, err.to_string()));
                    failures.push(err);
                }
            }
        }

        if !failures.is_empty() {
            return Err(MergeError::ValidationFailed { failures });
        }

        state.validation = Some(results);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        match &state.validation {
            Some(results) if results.len() == ctx.inputs.len() => Ok(()),
            _ => Err(MergeError::internal("validation results not recorded")),
        }
    }
}
