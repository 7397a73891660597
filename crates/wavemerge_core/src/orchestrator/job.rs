//! High-level merge job facade.
//!
//! Wires inputs, options, logging, and a transcoder into a pipeline and
//! runs it to completion. This is the main entry point for embedders.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::engine::HEADER_LEN;
use crate::errors::MergeError;
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::models::{MergeOptions, MergeResult};
use crate::normalizer::{FfmpegTranscoder, Transcoder};

use super::pipeline::Pipeline;
use super::steps::{FinalizeStep, MergeStep, NormalizeStep, PlanStep, ValidateStep};
use super::types::{CancelHandle, Context, JobState, ProgressCallback};

/// Create the standard merge pipeline:
/// Validate -> Plan -> Normalize -> Merge -> Finalize.
pub fn create_merge_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ValidateStep::new())
        .with_step(PlanStep::new())
        .with_step(NormalizeStep::new())
        .with_step(MergeStep::new())
        .with_step(FinalizeStep::new())
}

/// Builder for a single merge job.
pub struct MergeJob {
    inputs: Vec<PathBuf>,
    output_path: PathBuf,
    options: MergeOptions,
    work_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_config: LogConfig,
    log_callback: Option<LogCallback>,
    progress_callback: Option<ProgressCallback>,
    transcoder: Arc<dyn Transcoder>,
    cancel: CancelHandle,
}

impl MergeJob {
    /// Create a job writing to `output_path`, with default options and
    /// the ffmpeg transcoder.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            inputs: Vec::new(),
            output_path: output_path.into(),
            options: MergeOptions::default(),
            work_dir: None,
            log_dir: None,
            log_config: LogConfig::default(),
            log_callback: None,
            progress_callback: None,
            transcoder: Arc::new(FfmpegTranscoder::default()),
            cancel: CancelHandle::new(),
        }
    }

    /// Create a job configured from application settings.
    pub fn from_settings(settings: &Settings, output_path: impl Into<PathBuf>) -> Self {
        let mut job = Self::new(output_path);
        job.options = settings.merge.to_options();
        job.work_dir = Some(PathBuf::from(&settings.paths.temp_root));
        job.log_dir = Some(PathBuf::from(&settings.paths.logs_folder));
        job.log_config = settings.logging.to_log_config();
        job.transcoder = Arc::new(FfmpegTranscoder::new(&settings.merge.ffmpeg_path));
        job
    }

    /// Append one input file.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Append several input files, in merge order.
    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Override the merge options.
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the crossfade duration in milliseconds.
    pub fn fade_ms(mut self, fade_duration_ms: u32) -> Self {
        self.options.fade_duration_ms = fade_duration_ms;
        self
    }

    /// Directory for conversion temp files. Defaults to the output
    /// file's directory.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Directory for the per-job log file. Without one the job logs
    /// through the callback only.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Replace the conversion backend.
    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Receive each log line.
    pub fn on_log(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    /// Receive progress updates: (phase, bytes_done, bytes_total).
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Handle for cancelling the job from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the job to completion.
    pub fn run(self) -> Result<MergeResult, MergeError> {
        let job_name = self.job_name();

        let work_dir = self
            .work_dir
            .clone()
            .or_else(|| self.output_path.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&work_dir)
            .map_err(|e| MergeError::io("create work directory", e))?;

        let logger = match &self.log_dir {
            Some(dir) => Arc::new(
                JobLogger::new(&job_name, dir, self.log_config.clone(), self.log_callback)
                    .map_err(|e| MergeError::io("create job log", e))?,
            ),
            None => Arc::new(JobLogger::detached(
                &job_name,
                self.log_config.clone(),
                self.log_callback,
            )),
        };

        logger.info(&format!(
            "Merging {} input(s) into '{}'",
            self.inputs.len(),
            self.output_path.display()
        ));

        let mut ctx = Context::new(
            self.inputs,
            self.options,
            self.output_path,
            work_dir,
            logger,
            self.transcoder,
            self.cancel,
        );
        if let Some(callback) = self.progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        let mut state = JobState::new(&job_name);
        create_merge_pipeline().run(&ctx, &mut state)?;

        let finalize = state
            .finalize
            .take()
            .ok_or_else(|| MergeError::internal("pipeline completed without output"))?;
        let stats = state
            .merge
            .take()
            .ok_or_else(|| MergeError::internal("pipeline completed without merge stats"))?;

        Ok(MergeResult {
            descriptor: finalize.descriptor,
            duration_secs: stats.duration_secs,
            bytes_written: HEADER_LEN + stats.data_bytes,
            warnings: stats.warnings,
        })
    }

    fn job_name(&self) -> String {
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "merge".to_string());
        format!("{}_{}", stem, chrono::Local::now().format("%Y%m%d_%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobPhase;
    use crate::test_wav;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    fn write_inputs(dir: &Path, formats: &[(u32, u16, u16, f64)]) -> Vec<PathBuf> {
        formats
            .iter()
            .enumerate()
            .map(|(i, &(rate, channels, bits, secs))| {
                let path = dir.join(format!("in{}.wav", i));
                let payload = test_wav::silence_payload(rate, channels, bits, secs);
                test_wav::write_wav(&path, rate, channels, bits, &payload);
                path
            })
            .collect()
    }

    #[test]
    fn merges_uniform_inputs_end_to_end() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(8000, 1, 16, 2.0), (8000, 1, 16, 3.0)]);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output)
            .inputs(inputs)
            .fade_ms(500)
            .run()
            .unwrap();

        // 2s + 3s with a 0.5s overlap.
        assert!((result.duration_secs - 4.5).abs() < 1e-9);
        assert_eq!(result.descriptor.sample_rate, 8000);
        assert!(result.warnings.is_empty());
        assert!(output.exists());
        assert_eq!(
            result.bytes_written,
            fs::metadata(&output).unwrap().len()
        );

        // Output parses with the same inspector used for inputs.
        let reparsed = crate::inspector::inspect_file(&output).unwrap();
        assert_eq!(reparsed, result.descriptor);
    }

    #[test]
    fn converts_mismatched_inputs_to_the_max_profile() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(44100, 1, 16, 0.5), (22050, 1, 16, 0.5)]);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output)
            .inputs(inputs)
            .transcoder(Arc::new(test_wav::FakeTranscoder))
            .run()
            .unwrap();

        assert_eq!(result.descriptor.sample_rate, 44100);
        assert!(output.exists());

        // Conversion temp files are gone once the job finishes.
        assert!(!dir.path().join("normalized_001.wav").exists());
    }

    #[test]
    fn mismatch_without_auto_convert_leaves_no_artifact() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(44100, 1, 16, 0.5), (22050, 1, 16, 0.5)]);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output)
            .inputs(inputs)
            .options(MergeOptions {
                auto_convert: false,
                ..Default::default()
            })
            .run();

        assert!(matches!(result, Err(MergeError::FormatMismatch { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn validation_reports_every_bad_input() {
        let dir = tempdir().unwrap();
        let good = write_inputs(dir.path(), &[(8000, 1, 16, 0.5)]);
        let bad1 = dir.path().join("bad1.wav");
        let bad2 = dir.path().join("bad2.wav");
        fs::write(&bad1, b"not a wav").unwrap();
        fs::write(&bad2, b"also not a wav").unwrap();
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output)
            .input(&good[0])
            .input(&bad1)
            .input(&bad2)
            .run();

        match result {
            Err(MergeError::ValidationFailed { failures }) => {
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().any(|f| matches!(
                    f,
                    MergeError::MalformedContainer { input, .. } if *input == bad1
                )));
                assert!(failures.iter().any(|f| matches!(
                    f,
                    MergeError::MalformedContainer { input, .. } if *input == bad2
                )));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn partial_frame_input_fails_validation() {
        let dir = tempdir().unwrap();
        // 5 bytes is 2.5 frames of 16-bit mono; merging must reject it
        // instead of silently dropping the trailing bytes.
        let ragged = dir.path().join("ragged.wav");
        test_wav::write_wav(&ragged, 8000, 1, 16, &[1, 2, 3, 4, 5]);
        let whole = write_inputs(dir.path(), &[(8000, 1, 16, 0.1)]);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output).input(&ragged).input(&whole[0]).run();

        match result {
            Err(MergeError::ValidationFailed { failures }) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].to_string().contains("whole number"));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn empty_input_list_fails_validation() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output).run();
        match result {
            Err(MergeError::ValidationFailed { failures }) => assert!(failures.is_empty()),
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn cancelled_job_removes_the_partial_output() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(8000, 1, 16, 2.0), (8000, 1, 16, 2.0)]);
        let output = dir.path().join("merged.wav");

        let job = MergeJob::new(&output).inputs(inputs);
        job.cancel_handle().cancel();

        let result = job.run();
        assert!(matches!(result, Err(MergeError::Cancelled)));
        assert!(!output.exists());
    }

    #[test]
    fn clamped_fade_surfaces_as_a_warning() {
        let dir = tempdir().unwrap();
        // Second input is 0.1 s; a 2 s fade clamps to 0.05 s.
        let inputs = write_inputs(dir.path(), &[(8000, 1, 16, 1.0), (8000, 1, 16, 0.1)]);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output)
            .inputs(inputs)
            .fade_ms(2000)
            .run()
            .unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].boundary, 0);
    }

    #[test]
    fn progress_reaches_completed_phase() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(8000, 1, 16, 1.0)]);
        let output = dir.path().join("merged.wav");

        let completed = Arc::new(AtomicBool::new(false));
        let seen = completed.clone();
        MergeJob::new(&output)
            .inputs(inputs)
            .on_progress(Box::new(move |phase, _, _| {
                if phase == JobPhase::Completed {
                    seen.store(true, Ordering::SeqCst);
                }
            }))
            .run()
            .unwrap();

        assert!(completed.load(Ordering::SeqCst));
    }

    #[test]
    fn job_log_records_the_phases() {
        let dir = tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[(8000, 1, 16, 1.0)]);
        let output = dir.path().join("merged.wav");
        let log_dir = dir.path().join("logs");

        MergeJob::new(&output)
            .inputs(inputs)
            .log_dir(&log_dir)
            .run()
            .unwrap();

        let entries: Vec<_> = fs::read_dir(&log_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content =
            fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("=== Validate ==="));
        assert!(content.contains("=== Merge ==="));
        assert!(content.contains("[SUCCESS]"));
    }

    #[test]
    fn single_input_is_rewritten_verbatim() {
        let dir = tempdir().unwrap();
        let payload = test_wav::ramp_payload(4000, 1, 16);
        let input = dir.path().join("solo.wav");
        test_wav::write_wav(&input, 8000, 1, 16, &payload);
        let output = dir.path().join("merged.wav");

        let result = MergeJob::new(&output).input(&input).run().unwrap();

        assert_eq!(result.descriptor.data_len, payload.len() as u64);
        let bytes = fs::read(&output).unwrap();
        assert_eq!(&bytes[44..], &payload[..]);
    }
}
