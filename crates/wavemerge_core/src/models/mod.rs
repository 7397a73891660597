//! Data models for the merge engine.
//!
//! This module contains the core data structures shared across components:
//! - Format descriptors and validation results produced by the inspector
//! - The target profile chosen by the planner
//! - Merge options, results, and the job phase state machine

mod enums;
mod format;
mod options;
mod results;

pub use enums::JobPhase;
pub use format::{FormatDescriptor, TargetProfile, ValidationOutcome, ValidationResult, WAVE_FORMAT_PCM};
pub use options::MergeOptions;
pub use results::{MergeResult, MergeWarning};
