//! Format descriptors, validation results, and the target profile.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Codec tag for linear PCM in the WAVE format chunk.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Parsed format of a single WAV container.
///
/// Immutable once produced by the inspector. Records where the PCM
/// payload lives within its container (the payload itself is never
/// buffered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Codec tag from the format chunk (always PCM for a valid descriptor).
    pub codec_tag: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count (>= 1).
    pub channels: u16,
    /// Bits per sample: 8, 16, 24, or 32.
    pub bits_per_sample: u16,
    /// Byte offset of the data chunk payload within the container.
    pub data_offset: u64,
    /// Byte length of the data chunk payload.
    pub data_len: u64,
}

impl FormatDescriptor {
    /// Bytes per frame (one sample per channel).
    pub fn block_align(&self) -> u64 {
        self.channels as u64 * (self.bits_per_sample as u64 / 8)
    }

    /// Bytes of payload per second.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align()
    }

    /// Number of whole frames in the payload.
    pub fn frames(&self) -> u64 {
        self.data_len / self.block_align()
    }

    /// Payload duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.data_len as f64 / self.byte_rate() as f64
    }

    /// The format dimensions of this descriptor, without payload location.
    pub fn profile(&self) -> TargetProfile {
        TargetProfile {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
        }
    }

    /// Whether this descriptor's dimensions match a target profile exactly.
    pub fn matches(&self, target: &TargetProfile) -> bool {
        self.sample_rate == target.sample_rate
            && self.channels == target.channels
            && self.bits_per_sample == target.bits_per_sample
    }
}

/// The single format every stream entering the merge is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl TargetProfile {
    /// Bytes per frame at this profile.
    pub fn block_align(&self) -> u64 {
        self.channels as u64 * (self.bits_per_sample as u64 / 8)
    }

    /// Bytes of payload per second at this profile.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align()
    }
}

impl std::fmt::Display for TargetProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// Per-input validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// Input parsed cleanly.
    Valid(FormatDescriptor),
    /// Input was rejected.
    Invalid { reason: String },
}

/// Result of inspecting one input. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The input this result describes.
    pub input: PathBuf,
    /// Valid-with-descriptor or invalid-with-reason.
    pub outcome: ValidationOutcome,
}

impl ValidationResult {
    /// Create a valid result.
    pub fn valid(input: impl Into<PathBuf>, descriptor: FormatDescriptor) -> Self {
        Self {
            input: input.into(),
            outcome: ValidationOutcome::Valid(descriptor),
        }
    }

    /// Create an invalid result.
    pub fn invalid(input: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            outcome: ValidationOutcome::Invalid {
                reason: reason.into(),
            },
        }
    }

    /// Whether the input validated.
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, ValidationOutcome::Valid(_))
    }

    /// The descriptor, if the input validated.
    pub fn descriptor(&self) -> Option<&FormatDescriptor> {
        match &self.outcome {
            ValidationOutcome::Valid(desc) => Some(desc),
            ValidationOutcome::Invalid { .. } => None,
        }
    }

    /// The input path.
    pub fn input(&self) -> &Path {
        &self.input
    }
}
