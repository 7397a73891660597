//! Finalize step: patch the container sizes and verify the output.

use crate::errors::MergeError;
use crate::finalizer;
use crate::models::JobPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FinalizeOutput, JobState, StepOutcome};

pub struct FinalizeStep;

impl FinalizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FinalizeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FinalizeStep {
    fn name(&self) -> &str {
        "Finalize"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Finalizing
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        if state.sink.is_none() || state.merge.is_none() {
            return Err(MergeError::internal("finalization requires a merged sink"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError> {
        let target = state
            .plan
            .as_ref()
            .map(|p| p.target)
            .ok_or_else(|| MergeError::internal("merge plan missing"))?;
        let data_bytes = state
            .merge
            .as_ref()
            .map(|m| m.data_bytes)
            .ok_or_else(|| MergeError::internal("merge statistics missing"))?;
        let sink = state
            .sink
            .take()
            .ok_or_else(|| MergeError::internal("output sink missing"))?;

        let descriptor = finalizer::finalize(sink, &target, data_bytes)?;

        ctx.logger.validation(&format!(
            "Output verified: {}, {:.3}s",
            descriptor.profile(),
            descriptor.duration_secs()
        ));

        state.finalize = Some(FinalizeOutput {
            output_path: ctx.output_path.clone(),
            descriptor,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        match &state.finalize {
            Some(output) if output.output_path.exists() => Ok(()),
            Some(_) => Err(MergeError::internal("finalized output file is missing")),
            None => Err(MergeError::internal("finalize output not recorded")),
        }
    }
}
