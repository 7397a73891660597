//! RIFF chunk walking.

use std::io::{Read, Seek, SeekFrom};

use super::InspectError;

/// A tagged, length-prefixed section within a RIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Four-byte chunk tag (e.g. `fmt `, `data`).
    pub id: [u8; 4],
    /// Declared payload size in bytes.
    pub size: u32,
    /// Byte offset of the chunk header within the container.
    pub offset: u64,
}

impl ChunkInfo {
    /// Chunk tag as a lossy string, for logs and errors.
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// Read and check the 12-byte RIFF/WAVE header.
///
/// Returns the declared end of the container (`8 + riff_size`).
pub(super) fn read_riff_header<R: Read + Seek>(
    reader: &mut R,
    stream_len: u64,
) -> Result<u64, InspectError> {
    if stream_len < 12 {
        return Err(InspectError::malformed(0, "container shorter than a RIFF header"));
    }

    reader.seek(SeekFrom::Start(0))?;
    let mut header = [0u8; 12];
    reader.read_exact(&mut header)?;

    if &header[0..4] != b"RIFF" {
        return Err(InspectError::malformed(0, "missing RIFF tag"));
    }
    if &header[8..12] != b"WAVE" {
        return Err(InspectError::malformed(8, "missing WAVE tag"));
    }

    let riff_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as u64;
    let declared_end = 8 + riff_size;
    if declared_end > stream_len {
        return Err(InspectError::malformed(
            4,
            format!(
                "declared RIFF size {} exceeds stream length {}",
                riff_size, stream_len
            ),
        ));
    }

    Ok(declared_end)
}

/// Walk every chunk in the container, in order.
///
/// Unknown chunk types are included; odd-sized chunks are followed by a
/// pad byte which is skipped but not counted in the declared size.
pub fn walk_chunks<R: Read + Seek>(
    reader: &mut R,
    stream_len: u64,
) -> Result<Vec<ChunkInfo>, InspectError> {
    let declared_end = read_riff_header(reader, stream_len)?;

    let mut chunks = Vec::new();
    let mut pos: u64 = 12;

    while pos + 8 <= declared_end {
        reader.seek(SeekFrom::Start(pos))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;

        let mut id = [0u8; 4];
        id.copy_from_slice(&header[0..4]);
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

        chunks.push(ChunkInfo { id, size, offset: pos });

        // Skip the pad byte after odd-sized chunks.
        pos = body_end + (size as u64 & 1);
    }

    Ok(chunks)
}
