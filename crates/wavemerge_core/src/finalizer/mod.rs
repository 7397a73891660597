//! Container finalization.
//!
//! Patches the two size fields the sink left provisional, syncs, then
//! re-reads the output through the same inspector used for inputs. The
//! sink is only committed once the output verifies; any failure here
//! drops the sink and with it the partial file.

use crate::engine::{OutputSink, DATA_SIZE_OFFSET, HEADER_LEN, RIFF_SIZE_OFFSET};
use crate::errors::MergeError;
use crate::inspector;
use crate::models::{FormatDescriptor, TargetProfile};

/// Patch sizes, verify the container, and commit the output file.
pub fn finalize(
    mut sink: OutputSink,
    target: &TargetProfile,
    data_bytes: u64,
) -> Result<FormatDescriptor, MergeError> {
    let total = sink.bytes_written();
    if total != HEADER_LEN + data_bytes {
        return Err(MergeError::internal(format!(
            "output holds {} bytes but the merge reported {} payload bytes",
            total, data_bytes
        )));
    }
    if total - 8 > u32::MAX as u64 {
        return Err(MergeError::size_limit(total, u32::MAX as u64));
    }

    sink.patch_u32_at(RIFF_SIZE_OFFSET, (total - 8) as u32)?;
    sink.patch_u32_at(DATA_SIZE_OFFSET, data_bytes as u32)?;
    sink.sync()?;

    let descriptor = inspector::inspect_file(sink.path()).map_err(|e| {
        MergeError::internal(format!("finalized output failed verification: {}", e))
    })?;
    if !descriptor.matches(target) {
        return Err(MergeError::internal(format!(
            "finalized output is {} instead of the planned {}",
            descriptor.profile(),
            target
        )));
    }
    if descriptor.data_len != data_bytes {
        return Err(MergeError::internal(format!(
            "finalized output declares {} payload bytes, expected {}",
            descriptor.data_len, data_bytes
        )));
    }

    let path = sink.commit();
    tracing::debug!(
        "finalized '{}': {} payload bytes, {:.3}s",
        path.display(),
        data_bytes,
        descriptor.duration_secs()
    );
    Ok(descriptor)
}
