//! ffmpeg-backed transcoder.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::models::TargetProfile;

use super::{TranscodeError, Transcoder};

/// ffmpeg encoder name for each supported PCM bit depth.
const BIT_DEPTH_CODECS: [(u16, &str); 4] = [
    (8, "pcm_u8"),
    (16, "pcm_s16le"),
    (24, "pcm_s24le"),
    (32, "pcm_s32le"),
];

fn codec_for_bits(bits: u16) -> Option<&'static str> {
    BIT_DEPTH_CODECS
        .iter()
        .find(|(depth, _)| *depth == bits)
        .map(|(_, codec)| *codec)
}

/// Transcoder that shells out to the ffmpeg binary.
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Use an explicit ffmpeg binary path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

fn build_args(input: &Path, target: &TargetProfile, output: &Path, codec: &str) -> Vec<String> {
    vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.display().to_string(),
        "-ar".into(),
        target.sample_rate.to_string(),
        "-ac".into(),
        target.channels.to_string(),
        "-c:a".into(),
        codec.into(),
        output.display().to_string(),
    ]
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &self,
        input: &Path,
        target: &TargetProfile,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let codec = codec_for_bits(target.bits_per_sample).ok_or_else(|| {
            TranscodeError(format!(
                "no PCM encoder for {}-bit output",
                target.bits_per_sample
            ))
        })?;

        tracing::debug!(
            "transcoding '{}' to {} via {}",
            input.display(),
            target,
            codec
        );

        let result = Command::new(&self.program)
            .args(build_args(input, target, output, codec))
            .output()
            .map_err(|e| {
                TranscodeError(format!(
                    "failed to launch '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TranscodeError(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn command_line(
        &self,
        input: &Path,
        target: &TargetProfile,
        output: &Path,
    ) -> Option<String> {
        let codec = codec_for_bits(target.bits_per_sample)?;
        Some(format!(
            "{} {}",
            self.program.display(),
            build_args(input, target, output, codec).join(" ")
        ))
    }
}
