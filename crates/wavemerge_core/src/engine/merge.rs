//! Streaming merge: sequential concatenation with sample-accurate
//! linear crossfades at each splice point.
//!
//! Payloads are never loaded whole. Each stream's middle section is
//! copied through a fixed-size buffer; only the overlap regions at a
//! boundary (at most half of either neighboring stream) are held in
//! memory for blending. Cancellation and the output size ceiling are
//! checked once per buffer, so the chosen buffer size changes latency
//! but never the output bytes.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::errors::MergeError;
use crate::models::{FormatDescriptor, MergeOptions, MergeWarning, TargetProfile};

use super::pcm;
use super::sink::OutputSink;

/// Headroom kept under the u32 RIFF ceiling so the finalizer's size
/// fields can never wrap.
pub(crate) const MAX_OUTPUT_BYTES: u64 = u32::MAX as u64 - 65_536;

/// One normalized input, ready to merge.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub path: PathBuf,
    pub descriptor: FormatDescriptor,
}

/// Outcome of the payload-writing phase.
#[derive(Debug, Clone)]
pub struct MergeStats {
    /// Payload bytes written (excludes the 44-byte header).
    pub data_bytes: u64,
    /// Output duration in seconds.
    pub duration_secs: f64,
    /// Clamped crossfades and other non-fatal conditions.
    pub warnings: Vec<MergeWarning>,
}

/// Merge `inputs` into `sink` under the default output size ceiling.
pub fn merge_streams(
    sink: &mut OutputSink,
    inputs: &[MergeInput],
    target: &TargetProfile,
    options: &MergeOptions,
    progress: &dyn Fn(u64, u64),
    should_cancel: &dyn Fn() -> bool,
) -> Result<MergeStats, MergeError> {
    merge_streams_with_limit(
        sink,
        inputs,
        target,
        options,
        progress,
        should_cancel,
        MAX_OUTPUT_BYTES,
    )
}

/// Merge with an explicit output size ceiling.
#[allow(clippy::too_many_arguments)]
pub(crate) fn merge_streams_with_limit(
    sink: &mut OutputSink,
    inputs: &[MergeInput],
    target: &TargetProfile,
    options: &MergeOptions,
    progress: &dyn Fn(u64, u64),
    should_cancel: &dyn Fn() -> bool,
    limit: u64,
) -> Result<MergeStats, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::internal("merge invoked with no input streams"));
    }
    for input in inputs {
        if !input.descriptor.matches(target) {
            return Err(MergeError::internal(format!(
                "stream '{}' does not match the merge target {}",
                input.path.display(),
                target
            )));
        }
    }

    let options = options.normalized();
    let frame_len = target.block_align() as usize;
    let frames: Vec<u64> = inputs.iter().map(|i| i.descriptor.frames()).collect();

    // Requested fade in frames, then clamped per boundary to half of
    // either neighboring stream.
    let requested =
        (options.fade_duration_ms as u64 * target.sample_rate as u64) / 1000;
    let mut warnings = Vec::new();
    let mut fades: Vec<u64> = Vec::with_capacity(inputs.len().saturating_sub(1));
    for i in 0..inputs.len().saturating_sub(1) {
        let fade = requested.min(frames[i] / 2).min(frames[i + 1] / 2);
        if fade < requested {
            warnings.push(MergeWarning {
                boundary: i,
                message: format!(
                    "crossfade clamped from {} to {} frames",
                    requested, fade
                ),
            });
        }
        fades.push(fade);
    }

    let total_frames: u64 = frames.iter().sum::<u64>() - fades.iter().sum::<u64>();
    let total_bytes = sink.bytes_written() + total_frames * frame_len as u64;

    tracing::debug!(
        "merging {} streams, {} frames total, fade {} frames requested",
        inputs.len(),
        total_frames,
        requested
    );

    let buffer_size = options.buffer_size;
    let mut buf = vec![0u8; buffer_size];

    for (i, input) in inputs.iter().enumerate() {
        let head_skip = if i == 0 { 0 } else { fades[i - 1] };
        let tail_reserve = if i + 1 < inputs.len() { fades[i] } else { 0 };

        let mut reader = open_at(input, head_skip, frame_len)?;

        // Middle section: everything not consumed by a blend.
        let middle_frames = frames[i] - head_skip - tail_reserve;
        let mut remaining = middle_frames * frame_len as u64;
        while remaining > 0 {
            if should_cancel() {
                return Err(MergeError::Cancelled);
            }
            let n = remaining.min(buffer_size as u64) as usize;
            reader
                .read_exact(&mut buf[..n])
                .map_err(|e| read_error(input, e))?;
            write_checked(sink, &buf[..n], limit)?;
            progress(sink.bytes_written(), total_bytes);
            remaining -= n as u64;
        }

        // Boundary blend: this stream's tail against the next one's head.
        if tail_reserve > 0 {
            let fade = tail_reserve as usize;
            let tail = read_frames(&mut reader, fade, frame_len)
                .map_err(|e| read_error(input, e))?;

            let next = &inputs[i + 1];
            let mut next_reader = open_at(next, 0, frame_len)?;
            let head = read_frames(&mut next_reader, fade, frame_len)
                .map_err(|e| read_error(next, e))?;

            let blended = pcm::crossfade(
                &tail,
                &head,
                fade,
                target.channels,
                target.bits_per_sample,
            );
            for chunk in blended.chunks(buffer_size) {
                if should_cancel() {
                    return Err(MergeError::Cancelled);
                }
                write_checked(sink, chunk, limit)?;
                progress(sink.bytes_written(), total_bytes);
            }
        }
    }

    let data_bytes = total_frames * frame_len as u64;
    Ok(MergeStats {
        data_bytes,
        duration_secs: total_frames as f64 / target.sample_rate as f64,
        warnings,
    })
}

fn open_at(input: &MergeInput, skip_frames: u64, frame_len: usize) -> Result<File, MergeError> {
    let mut file = File::open(&input.path)
        .map_err(|e| MergeError::io(format!("open input '{}'", input.path.display()), e))?;
    let start = input.descriptor.data_offset + skip_frames * frame_len as u64;
    file.seek(SeekFrom::Start(start))
        .map_err(|e| MergeError::io(format!("seek input '{}'", input.path.display()), e))?;
    Ok(file)
}

fn read_frames(reader: &mut File, frames: usize, frame_len: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; frames * frame_len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_error(input: &MergeInput, source: std::io::Error) -> MergeError {
    MergeError::io(format!("read input '{}'", input.path.display()), source)
}

fn write_checked(sink: &mut OutputSink, chunk: &[u8], limit: u64) -> Result<(), MergeError> {
    let attempted = sink.bytes_written() + chunk.len() as u64;
    if attempted > limit {
        return Err(MergeError::size_limit(attempted, limit));
    }
    sink.write_all(chunk)
}
