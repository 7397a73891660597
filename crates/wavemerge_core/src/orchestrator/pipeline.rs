//! Pipeline runner that executes steps in sequence.

use crate::errors::MergeError;
use crate::models::JobPhase;

use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Steps execute in order with validation before and after each one.
/// The job phase tracks the running step; on failure the phase becomes
/// `Failed`, except for cancellation inside the merge loop, which ends
/// the job in `Cancelled`.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// On success the state ends in `Completed`; on error in `Failed`
    /// or `Cancelled`.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> Result<(), MergeError> {
        for step in &self.steps {
            let step_name = step.name();
            state.phase = step.phase();
            ctx.logger.phase(step_name);
            ctx.report_progress(state.phase, 0, 0);

            if let Err(e) = self.run_step(step.as_ref(), ctx, state) {
                state.phase = match e {
                    MergeError::Cancelled => JobPhase::Cancelled,
                    _ => JobPhase::Failed,
                };
                ctx.logger.error(&format!("{} failed: {}", step_name, e));
                ctx.report_progress(state.phase, 0, 0);
                return Err(e);
            }
        }

        state.phase = JobPhase::Completed;
        ctx.logger.success("Merge job completed");
        ctx.report_progress(JobPhase::Completed, 0, 0);
        Ok(())
    }

    fn run_step(
        &self,
        step: &dyn PipelineStep,
        ctx: &Context,
        state: &mut JobState,
    ) -> Result<(), MergeError> {
        step.validate_input(ctx, state)?;

        match step.execute(ctx, state)? {
            StepOutcome::Success => step.validate_output(ctx, state),
            StepOutcome::Skipped(reason) => {
                ctx.logger.info(&format!("{} skipped: {}", step.name(), reason));
                Ok(())
            }
        }
    }

    /// Number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::MergeOptions;
    use crate::normalizer::{TranscodeError, Transcoder};
    use crate::orchestrator::types::CancelHandle;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NoopTranscoder;

    impl Transcoder for NoopTranscoder {
        fn transcode(
            &self,
            _input: &Path,
            _target: &crate::models::TargetProfile,
            _output: &Path,
        ) -> Result<(), TranscodeError> {
            Err(TranscodeError("not implemented".to_string()))
        }
    }

    fn test_context() -> Context {
        Context::new(
            vec![],
            MergeOptions::default(),
            PathBuf::from("out.wav"),
            PathBuf::from("."),
            Arc::new(JobLogger::detached("test", LogConfig::default(), None)),
            Arc::new(NoopTranscoder),
            CancelHandle::new(),
        )
    }

    struct CountingStep {
        name: &'static str,
        executions: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn phase(&self) -> crate::models::JobPhase {
            crate::models::JobPhase::Validating
        }

        fn validate_input(&self, _ctx: &Context, _state: &JobState) -> Result<(), MergeError> {
            Ok(())
        }

        fn execute(
            &self,
            _ctx: &Context,
            _state: &mut JobState,
        ) -> Result<StepOutcome, MergeError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(MergeError::internal("boom"))
            } else {
                Ok(StepOutcome::Success)
            }
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> Result<(), MergeError> {
            Ok(())
        }
    }

    #[test]
    fn runs_steps_in_order_and_completes() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "One",
                executions: count.clone(),
                fail: false,
            })
            .with_step(CountingStep {
                name: "Two",
                executions: count.clone(),
                fail: false,
            });

        assert_eq!(pipeline.step_names(), vec!["One", "Two"]);

        let ctx = test_context();
        let mut state = JobState::new("job");
        pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(state.phase, crate::models::JobPhase::Completed);
    }

    #[test]
    fn failure_stops_the_pipeline_and_marks_failed() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "Boom",
                executions: count.clone(),
                fail: true,
            })
            .with_step(CountingStep {
                name: "Never",
                executions: count.clone(),
                fail: false,
            });

        let ctx = test_context();
        let mut state = JobState::new("job");
        let result = pipeline.run(&ctx, &mut state);

        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(state.phase, crate::models::JobPhase::Failed);
    }
}
