//! Merge step: stream the normalized inputs into the output sink.

use crate::engine::{self, MergeInput, OutputSink};
use crate::errors::MergeError;
use crate::models::JobPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Writes the provisional output and the whole payload. The sink stays
/// open in the job state for the Finalize step; if anything downstream
/// fails, dropping the state removes the partial file.
pub struct MergeStep;

impl MergeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MergeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MergeStep {
    fn name(&self) -> &str {
        "Merge"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Merging
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        match &state.streams {
            Some(streams) if !streams.is_empty() => Ok(()),
            _ => Err(MergeError::internal("merging requires normalized streams")),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> Result<StepOutcome, MergeError> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| MergeError::internal("merge plan missing"))?;
        let streams = state
            .streams
            .as_ref()
            .ok_or_else(|| MergeError::internal("normalized streams missing"))?;

        let inputs: Vec<MergeInput> = streams
            .iter()
            .map(|s| MergeInput {
                path: s.path().to_path_buf(),
                descriptor: *s.descriptor(),
            })
            .collect();

        let mut sink = OutputSink::create(&ctx.output_path, &plan.target)?;

        let logger = ctx.logger.clone();
        let progress = |done: u64, total: u64| {
            ctx.report_progress(JobPhase::Merging, done, total);
            if total > 0 {
                logger.progress(((done * 100) / total) as u32);
            }
        };
        let cancel = ctx.cancel.clone();
        let should_cancel = move || cancel.is_cancelled();

        let stats = engine::merge_streams(
            &mut sink,
            &inputs,
            &plan.target,
            &ctx.options,
            &progress,
            &should_cancel,
        )?;

        for warning in &stats.warnings {
            ctx.logger.warn(&warning.to_string());
        }
        ctx.logger.info(&format!(
            "Wrote {} payload bytes ({:.3}s)",
            stats.data_bytes, stats.duration_secs
        ));

        state.sink = Some(sink);
        state.merge = Some(stats);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> Result<(), MergeError> {
        let sink = state
            .sink
            .as_ref()
            .ok_or_else(|| MergeError::internal("output sink not recorded"))?;
        let stats = state
            .merge
            .as_ref()
            .ok_or_else(|| MergeError::internal("merge statistics not recorded"))?;

        if sink.bytes_written() != crate::engine::HEADER_LEN + stats.data_bytes {
            return Err(MergeError::internal(format!(
                "sink holds {} bytes, expected {}",
                sink.bytes_written(),
                crate::engine::HEADER_LEN + stats.data_bytes
            )));
        }
        Ok(())
    }
}
