//! Merge job results and warnings.

use serde::{Deserialize, Serialize};

use super::format::FormatDescriptor;

/// Non-fatal condition recorded while merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeWarning {
    /// Zero-based boundary index (between stream `i` and `i + 1`).
    pub boundary: usize,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boundary {}: {}", self.boundary, self.message)
    }
}

/// Final result of a successful merge job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    /// Descriptor of the finalized output, as re-read by the inspector.
    pub descriptor: FormatDescriptor,
    /// Total output duration in seconds (input durations minus overlap).
    pub duration_secs: f64,
    /// Total bytes written to the output file, header included.
    pub bytes_written: u64,
    /// Non-fatal warnings accumulated during the merge.
    pub warnings: Vec<MergeWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WAVE_FORMAT_PCM;

    #[test]
    fn result_serializes() {
        let result = MergeResult {
            descriptor: FormatDescriptor {
                codec_tag: WAVE_FORMAT_PCM,
                sample_rate: 44100,
                channels: 1,
                bits_per_sample: 16,
                data_offset: 44,
                data_len: 88200,
            },
            duration_secs: 1.0,
            bytes_written: 88244,
            warnings: vec![MergeWarning {
                boundary: 0,
                message: "crossfade clamped".to_string(),
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"duration_secs\":1.0"));
        assert!(json.contains("crossfade clamped"));
    }
}
