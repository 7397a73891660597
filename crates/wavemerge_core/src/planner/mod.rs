//! Normalization planning.
//!
//! Picks one target profile for the whole job by taking the maximum of
//! each format dimension across the validated inputs, then marks every
//! input as pass-through or needing conversion. Lossless for whichever
//! inputs already sit at the maximum in every dimension.

use std::path::PathBuf;

use crate::errors::MergeError;
use crate::models::{FormatDescriptor, TargetProfile};

/// How one input reaches the target profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Already at the target; its payload is merged as-is.
    PassThrough,
    /// Must be transcoded to the target before merging.
    Convert,
}

/// One input's place in the plan.
#[derive(Debug, Clone)]
pub struct PlannedInput {
    pub path: PathBuf,
    pub descriptor: FormatDescriptor,
    pub action: InputAction,
}

/// Job-wide normalization plan.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub target: TargetProfile,
    pub inputs: Vec<PlannedInput>,
}

impl MergePlan {
    /// Number of inputs that need conversion.
    pub fn conversions_needed(&self) -> usize {
        self.inputs
            .iter()
            .filter(|i| i.action == InputAction::Convert)
            .count()
    }
}

/// Compute the target profile and per-input actions.
///
/// With `auto_convert` off, any input not already at the target makes
/// the whole job fail with `FormatMismatch`.
pub fn plan(
    inputs: &[(PathBuf, FormatDescriptor)],
    auto_convert: bool,
) -> Result<MergePlan, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::internal("planner invoked with no inputs"));
    }

    let target = TargetProfile {
        sample_rate: inputs.iter().map(|(_, d)| d.sample_rate).max().unwrap_or(0),
        channels: inputs.iter().map(|(_, d)| d.channels).max().unwrap_or(0),
        bits_per_sample: inputs
            .iter()
            .map(|(_, d)| d.bits_per_sample)
            .max()
            .unwrap_or(0),
    };

    let planned: Vec<PlannedInput> = inputs
        .iter()
        .map(|(path, descriptor)| {
            let action = if descriptor.matches(&target) {
                InputAction::PassThrough
            } else {
                InputAction::Convert
            };
            PlannedInput {
                path: path.clone(),
                descriptor: *descriptor,
                action,
            }
        })
        .collect();

    let mismatched: Vec<PathBuf> = planned
        .iter()
        .filter(|i| i.action == InputAction::Convert)
        .map(|i| i.path.clone())
        .collect();

    if !mismatched.is_empty() && !auto_convert {
        let detail = planned
            .iter()
            .filter(|i| i.action == InputAction::Convert)
            .map(|i| format!("'{}' is {}", i.path.display(), i.descriptor.profile()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MergeError::FormatMismatch {
            inputs: mismatched,
            detail: format!("target is {}, but {}", target, detail),
        });
    }

    tracing::debug!(
        "planned target {} ({} of {} inputs need conversion)",
        target,
        mismatched.len(),
        planned.len()
    );

    Ok(MergePlan {
        target,
        inputs: planned,
    })
}
