//! Error taxonomy for the merge engine.
//!
//! One public error type covers the whole job lifecycle so callers can
//! match on the failure kind directly. Errors carry the offending input
//! identifier(s) and byte offsets where relevant; none are retried or
//! swallowed internally.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::inspector::InspectError;

/// Top-level error for merge jobs.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The container's RIFF/fmt/data structure is broken.
    #[error("malformed container in '{}' at byte {offset}: {reason}", input.display())]
    MalformedContainer {
        input: PathBuf,
        offset: u64,
        reason: String,
    },

    /// The format chunk declares a codec other than linear PCM.
    #[error("unsupported codec tag {codec_tag:#06x} in '{}': only linear PCM is supported", input.display())]
    UnsupportedCodec { input: PathBuf, codec_tag: u16 },

    /// One or more inputs failed validation (aggregate, fail-fast).
    /// Each failure is the structured per-input error.
    #[error("validation failed for {} input(s): {}", failures.len(), format_failures(failures))]
    ValidationFailed { failures: Vec<MergeError> },

    /// Input formats differ and auto-convert is disabled.
    #[error("input formats differ and auto-convert is disabled: {detail}")]
    FormatMismatch { inputs: Vec<PathBuf>, detail: String },

    /// The external transcoder was unavailable or errored.
    #[error("conversion failed for '{}': {reason}", input.display())]
    ConversionFailed { input: PathBuf, reason: String },

    /// Writing the next buffer would overflow the RIFF 32-bit size field.
    #[error("output would exceed the RIFF size ceiling: {attempted_bytes} bytes (limit {limit})")]
    SizeLimitExceeded { attempted_bytes: u64, limit: u64 },

    /// The job was cancelled during streaming.
    #[error("job was cancelled")]
    Cancelled,

    /// The engine's own output failed its verification pass.
    #[error("internal invariant violated: {0}")]
    InternalError(String),

    /// Underlying stream I/O failure.
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl MergeError {
    /// Create an I/O error with operation context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an internal invariant violation.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Create a conversion failure for an input.
    pub fn conversion_failed(input: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a size-limit failure.
    pub fn size_limit(attempted_bytes: u64, limit: u64) -> Self {
        Self::SizeLimitExceeded {
            attempted_bytes,
            limit,
        }
    }

    /// Map an inspection error onto the taxonomy, attaching the input path.
    pub fn from_inspect(input: impl Into<PathBuf>, err: InspectError) -> Self {
        let input = input.into();
        match err {
            InspectError::MalformedContainer { offset, reason } => Self::MalformedContainer {
                input,
                offset,
                reason,
            },
            InspectError::UnsupportedCodec { codec_tag } => {
                Self::UnsupportedCodec { input, codec_tag }
            }
            InspectError::Io(source) => Self::Io {
                operation: format!("reading '{}'", input.display()),
                source,
            },
        }
    }
}

fn format_failures(failures: &[MergeError]) -> String {
    if failures.is_empty() {
        return "no input files provided".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failed_lists_every_input() {
        let err = MergeError::ValidationFailed {
            failures: vec![
                MergeError::MalformedContainer {
                    input: PathBuf::from("a.wav"),
                    offset: 12,
                    reason: "missing data chunk".to_string(),
                },
                MergeError::UnsupportedCodec {
                    input: PathBuf::from("b.wav"),
                    codec_tag: 0x0055,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.wav"));
        assert!(msg.contains("byte 12"));
        assert!(msg.contains("b.wav"));
        assert!(msg.contains("2 input(s)"));
    }

    #[test]
    fn inspect_error_maps_with_input_context() {
        let err = MergeError::from_inspect(
            "clip.wav",
            InspectError::UnsupportedCodec { codec_tag: 0x0003 },
        );
        match err {
            MergeError::UnsupportedCodec { input, codec_tag } => {
                assert_eq!(input, PathBuf::from("clip.wav"));
                assert_eq!(codec_tag, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn size_limit_displays_both_numbers() {
        let msg = MergeError::size_limit(5_000_000_000, 4_294_901_759).to_string();
        assert!(msg.contains("5000000000"));
        assert!(msg.contains("4294901759"));
    }
}
