//! Plan step: choose the target profile and per-input actions.

use crate::errors::MergeError;
use crate::models::JobPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::planner;

pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Planning
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        if state.validated_descriptors().is_none() {
            return Err(MergeError::internal("planning requires validated inputs"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError> {
        let descriptors = state
            .validated_descriptors()
            .ok_or_else(|| MergeError::internal("validation results missing"))?;

        let plan = planner::plan(&descriptors, ctx.options.auto_convert)?;

        ctx.logger.info(&format!("Target format: {}", plan.target));
        let conversions = plan.conversions_needed();
        if conversions > 0 {
            ctx.logger.info(&format!(
                "{} of {} input(s) will be converted",
                conversions,
                plan.inputs.len()
            ));
        } else {
            ctx.logger.info("All inputs match the target, no conversion needed");
        }

        state.plan = Some(plan);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        if state.plan.is_none() {
            return Err(MergeError::internal("merge plan not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_correct_identity() {
        let step = PlanStep::new();
        assert_eq!(step.name(), "Plan");
        assert_eq!(step.phase(), JobPhase::Planning);
    }
}
