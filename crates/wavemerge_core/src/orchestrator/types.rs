//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::{MergeStats, OutputSink};
use crate::logging::JobLogger;
use crate::models::{FormatDescriptor, JobPhase, MergeOptions, ValidationResult};
use crate::normalizer::{NormalizedStream, Transcoder};
use crate::planner::MergePlan;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (phase, bytes_done, bytes_total). For phases without a
/// byte measure, both values are zero.
pub type ProgressCallback = Box<dyn Fn(JobPhase, u64, u64) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Job configuration and shared resources that steps can read but not
/// modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Input WAV files, in merge order.
    pub inputs: Vec<PathBuf>,
    /// Merge options for this job.
    pub options: MergeOptions,
    /// Destination path for the merged file.
    pub output_path: PathBuf,
    /// Directory for conversion temp files.
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Conversion backend.
    pub transcoder: Arc<dyn Transcoder>,
    /// Cancellation flag, polled once per buffer while merging.
    pub cancel: CancelHandle,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    pub fn new(
        inputs: Vec<PathBuf>,
        options: MergeOptions,
        output_path: PathBuf,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
        transcoder: Arc<dyn Transcoder>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            inputs,
            options,
            output_path,
            work_dir,
            logger,
            transcoder,
            cancel,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, phase: JobPhase, done: u64, total: u64) {
        if let Some(ref callback) = self.progress_callback {
            callback(phase, done, total);
        }
    }
}

/// Handle for cancelling a running job.
///
/// Cancellation takes effect inside the merge loop, between buffers;
/// other phases run to completion.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<std::sync::atomic::AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// A write-once manifest: each step fills its own section and never
/// overwrites another's.
#[derive(Default)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started (RFC 3339).
    pub started_at: Option<String>,
    /// Current phase of the job.
    pub phase: JobPhase,
    /// Per-input validation results (from the Validate step).
    pub validation: Option<Vec<ValidationResult>>,
    /// Target profile and per-input actions (from the Plan step).
    pub plan: Option<MergePlan>,
    /// Merge-ready streams (from the Normalize step).
    pub streams: Option<Vec<NormalizedStream>>,
    /// Open output sink (created by the Merge step, consumed by Finalize).
    pub sink: Option<OutputSink>,
    /// Payload statistics (from the Merge step).
    pub merge: Option<MergeStats>,
    /// Verified output (from the Finalize step).
    pub finalize: Option<FinalizeOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Descriptors of the validated inputs, in order.
    pub fn validated_descriptors(&self) -> Option<Vec<(PathBuf, FormatDescriptor)>> {
        let results = self.validation.as_ref()?;
        results
            .iter()
            .map(|r| r.descriptor().map(|d| (r.input().to_path_buf(), *d)))
            .collect()
    }
}

/// Output from the Finalize step.
#[derive(Debug, Clone)]
pub struct FinalizeOutput {
    /// Path of the committed output file.
    pub output_path: PathBuf,
    /// Descriptor of the output as re-read by the inspector.
    pub descriptor: FormatDescriptor,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
