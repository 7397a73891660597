//! WAV container inspection.
//!
//! Parses a container's header chunks in order, locating the format and
//! data chunks by tag and tolerating intervening chunks of unknown type.
//! A pure parse: the data payload is never buffered, only its offset and
//! length are recorded.
//!
//! Used twice per job: once to validate inputs and once to verify the
//! finalized output.

mod chunks;

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use crate::models::{FormatDescriptor, ValidationResult, WAVE_FORMAT_PCM};

pub use chunks::{walk_chunks, ChunkInfo};

/// Error type for container inspection.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The RIFF/fmt/data structure is broken or truncated.
    #[error("malformed container at byte {offset}: {reason}")]
    MalformedContainer { offset: u64, reason: String },

    /// The format chunk declares a codec other than linear PCM.
    #[error("unsupported codec tag {codec_tag:#06x} (only linear PCM is supported)")]
    UnsupportedCodec { codec_tag: u16 },

    /// Underlying read failure.
    #[error("I/O error reading container: {0}")]
    Io(#[from] io::Error),
}

impl InspectError {
    fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            offset,
            reason: reason.into(),
        }
    }
}

/// Valid bit depths for linear PCM payloads.
const VALID_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

/// Parse the format of a WAV container from any seekable byte source.
///
/// `stream_len` is the total length of the source in bytes; chunk lengths
/// that run past the declared RIFF size (or a declared size past the
/// stream's end) are rejected.
pub fn parse_format<R: Read + Seek>(
    reader: &mut R,
    stream_len: u64,
) -> Result<FormatDescriptor, InspectError> {
    let declared_end = chunks::read_riff_header(reader, stream_len)?;

    let mut fmt: Option<(u16, u32, u16, u16)> = None;
    let mut data: Option<(u64, u64)> = None;
    let mut pos: u64 = 12;

    while pos + 8 <= declared_end {
        reader.seek(SeekFrom::Start(pos))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;

        let id = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let body_end = pos + 8 + size as u64;
        if body_end > declared_end {
            return Err(InspectError::malformed(
                pos,
                format!(
                    "chunk '{}' of {} bytes runs past the declared stream end",
                    String::from_utf8_lossy(&id),
                    size
                ),
            ));
        }

        match &id {
            b"fmt " => {
                if size < 16 {
                    return Err(InspectError::malformed(
                        pos,
                        format!("fmt chunk is {} bytes, expected at least 16", size),
                    ));
                }
                let mut body = [0u8; 16];
                reader.read_exact(&mut body)?;

                let codec_tag = u16::from_le_bytes([body[0], body[1]]);
                let channels = u16::from_le_bytes([body[2], body[3]]);
                let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);

                if codec_tag != WAVE_FORMAT_PCM {
                    return Err(InspectError::UnsupportedCodec { codec_tag });
                }
                if channels == 0 {
                    return Err(InspectError::malformed(pos, "channel count is zero"));
                }
                if sample_rate == 0 {
                    return Err(InspectError::malformed(pos, "sample rate is zero"));
                }
                if !VALID_BIT_DEPTHS.contains(&bits_per_sample) {
                    return Err(InspectError::malformed(
                        pos,
                        format!("unsupported bits per sample: {}", bits_per_sample),
                    ));
                }

                fmt = Some((codec_tag, sample_rate, channels, bits_per_sample));
            }
            b"data" => {
                data = Some((pos + 8, size as u64));
                if fmt.is_some() {
                    break;
                }
            }
            _ => {
                tracing::debug!(
                    "skipping chunk '{}' ({} bytes) at offset {}",
                    String::from_utf8_lossy(&id),
                    size,
                    pos
                );
            }
        }

        // Odd-sized chunks carry a pad byte not counted in the size field.
        pos = body_end + (size as u64 & 1);
    }

    let (codec_tag, sample_rate, channels, bits_per_sample) =
        fmt.ok_or_else(|| InspectError::malformed(pos, "missing fmt chunk"))?;
    let (data_offset, data_len) =
        data.ok_or_else(|| InspectError::malformed(pos, "missing data chunk"))?;

    // A PCM payload cannot hold a partial sample frame.
    let block_align = channels as u64 * (bits_per_sample as u64 / 8);
    if data_len % block_align != 0 {
        return Err(InspectError::malformed(
            data_offset - 8,
            format!(
                "data chunk length {} is not a whole number of {}-byte frames",
                data_len, block_align
            ),
        ));
    }

    Ok(FormatDescriptor {
        codec_tag,
        sample_rate,
        channels,
        bits_per_sample,
        data_offset,
        data_len,
    })
}

/// Parse the format of a WAV file on disk.
pub fn inspect_file(path: &Path) -> Result<FormatDescriptor, InspectError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    parse_format(&mut file, len)
}

/// Inspect one input, producing a per-input validation outcome.
pub fn inspect(path: &Path) -> ValidationResult {
    match inspect_file(path) {
        Ok(descriptor) => {
            tracing::debug!(
                "validated '{}': {}, {:.3}s",
                path.display(),
                descriptor.profile(),
                descriptor.duration_secs()
            );
            ValidationResult::valid(path, descriptor)
        }
        Err(err) => {
            tracing::debug!("rejected '{}': {}", path.display(), err);
            ValidationResult::invalid(path, err.to_string())
        }
    }
}

/// List every chunk in a WAV file, in container order.
pub fn list_chunks(path: &Path) -> Result<Vec<ChunkInfo>, InspectError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    walk_chunks(&mut file, len)
}
