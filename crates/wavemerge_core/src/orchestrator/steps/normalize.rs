//! Normalize step: bring every input to the target profile.

use crate::errors::MergeError;
use crate::models::JobPhase;
use crate::normalizer;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Runs the plan through the transcoder. Pass-through inputs are
/// wrapped as-is; converted streams live in the job's work directory
/// until the state is dropped.
pub struct NormalizeStep;

impl NormalizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NormalizeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NormalizeStep {
    fn name(&self) -> &str {
        "Normalize"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Normalizing
    }

    fn validate_input(&self, ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        if state.plan.is_none() {
            return Err(MergeError::internal("normalization requires a merge plan"));
        }
        if !ctx.work_dir.is_dir() {
            return Err(MergeError::internal(format!(
                "work directory '{}' does not exist",
                ctx.work_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| MergeError::internal("merge plan missing"))?;

        for input in plan.inputs.iter() {
            if input.action == crate::planner::InputAction::Convert {
                ctx.logger.info(&format!(
                    "Converting '{}' ({} -> {})",
                    input.path.display(),
                    input.descriptor.profile(),
                    plan.target
                ));
            }
        }

        let streams = normalizer::normalize(
            plan,
            ctx.transcoder.as_ref(),
            &ctx.work_dir,
            ctx.logger.as_ref(),
        )?;
        state.streams = Some(streams);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| MergeError::internal("merge plan missing"))?;
        let streams = state
            .streams
            .as_ref()
            .ok_or_else(|| MergeError::internal("normalized streams not recorded"))?;

        if streams.len() != plan.inputs.len() {
            return Err(MergeError::internal(format!(
                "{} streams recorded for {} inputs",
                streams.len(),
                plan.inputs.len()
            )));
        }
        for stream in streams {
            if !stream.descriptor().matches(&plan.target) {
                return Err(MergeError::internal(format!(
                    "stream '{}' does not match the target {}",
                    stream.path().display(),
                    plan.target
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_correct_identity() {
        let step = NormalizeStep::new();
        assert_eq!(step.name(), "Normalize");
        assert_eq!(step.phase(), JobPhase::Normalizing);
    }
}
