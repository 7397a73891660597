//! Stream normalization.
//!
//! Conversion itself is delegated through the [`Transcoder`] trait; the
//! default implementation shells out to ffmpeg. Every converted stream
//! is re-inspected before it is accepted, so a misbehaving transcoder
//! can never smuggle a wrong format into the merge.

mod ffmpeg;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::errors::MergeError;
use crate::inspector;
use crate::logging::JobLogger;
use crate::models::{FormatDescriptor, TargetProfile};
use crate::planner::{InputAction, MergePlan};

pub use ffmpeg::FfmpegTranscoder;

/// Failure reported by a transcoder backend.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TranscodeError(pub String);

/// Converts one WAV file to a target profile.
///
/// Implementations must write a complete WAV container to `output`;
/// the caller verifies the result and owns cleanup of failed attempts.
pub trait Transcoder: Send + Sync {
    fn transcode(
        &self,
        input: &Path,
        target: &TargetProfile,
        output: &Path,
    ) -> Result<(), TranscodeError>;

    /// The command this backend would run, for the job log. In-process
    /// backends return None.
    fn command_line(
        &self,
        _input: &Path,
        _target: &TargetProfile,
        _output: &Path,
    ) -> Option<String> {
        None
    }
}

/// A merge-ready stream, either the original file or an owned temp file.
///
/// Owned temp files are deleted when the stream is dropped.
#[derive(Debug)]
pub struct NormalizedStream {
    path: PathBuf,
    descriptor: FormatDescriptor,
    owned: bool,
}

impl NormalizedStream {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Whether this stream is a conversion artifact (vs. an input file).
    pub fn is_converted(&self) -> bool {
        self.owned
    }
}

impl Drop for NormalizedStream {
    fn drop(&mut self) {
        if self.owned {
            let _ = fs::remove_file(&self.path);
        }
    }
}

// Deletes a conversion artifact unless it is accepted.
struct TempGuard {
    path: PathBuf,
    keep: bool,
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Execute a plan: pass matching inputs through, convert the rest.
///
/// Temp files are created in `work_dir` and tied to the lifetime of the
/// returned streams.
pub fn normalize(
    plan: &MergePlan,
    transcoder: &dyn Transcoder,
    work_dir: &Path,
    logger: &JobLogger,
) -> Result<Vec<NormalizedStream>, MergeError> {
    let mut streams = Vec::with_capacity(plan.inputs.len());

    for (i, input) in plan.inputs.iter().enumerate() {
        match input.action {
            InputAction::PassThrough => {
                streams.push(NormalizedStream {
                    path: input.path.clone(),
                    descriptor: input.descriptor,
                    owned: false,
                });
            }
            InputAction::Convert => {
                let temp_path = work_dir.join(format!("normalized_{:03}.wav", i));
                let mut guard = TempGuard {
                    path: temp_path.clone(),
                    keep: false,
                };

                if let Some(cmd) = transcoder.command_line(&input.path, &plan.target, &temp_path)
                {
                    logger.command(&cmd);
                }
                transcoder
                    .transcode(&input.path, &plan.target, &temp_path)
                    .map_err(|e| MergeError::conversion_failed(&input.path, e.0))?;

                let descriptor = inspector::inspect_file(&temp_path).map_err(|e| {
                    MergeError::conversion_failed(
                        &input.path,
                        format!("transcoder produced an unreadable file: {}", e),
                    )
                })?;
                if !descriptor.matches(&plan.target) {
                    return Err(MergeError::conversion_failed(
                        &input.path,
                        format!(
                            "transcoder produced {} instead of the requested {}",
                            descriptor.profile(),
                            plan.target
                        ),
                    ));
                }

                tracing::debug!(
                    "converted '{}' from {} to {}",
                    input.path.display(),
                    input.descriptor.profile(),
                    plan.target
                );

                guard.keep = true;
                streams.push(NormalizedStream {
                    path: temp_path,
                    descriptor,
                    owned: true,
                });
            }
        }
    }

    Ok(streams)
}
