//! Output file sink.
//!
//! Owns the output file for the lifetime of a merge. The sink writes a
//! provisional header whose size fields are zero; the finalizer patches
//! them once the payload length is known. If the sink is dropped without
//! `commit()`, the partial file is removed.

use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::errors::MergeError;
use crate::models::TargetProfile;

/// Byte offset of the RIFF size field.
pub(crate) const RIFF_SIZE_OFFSET: u64 = 4;
/// Byte offset of the data chunk size field in a canonical header.
pub(crate) const DATA_SIZE_OFFSET: u64 = 40;
/// Length of the canonical header the sink writes.
pub(crate) const HEADER_LEN: u64 = 44;

pub struct OutputSink {
    file: File,
    path: PathBuf,
    bytes_written: u64,
    committed: bool,
}

impl OutputSink {
    /// Create the output file and write a provisional canonical header.
    pub fn create(path: &Path, target: &TargetProfile) -> Result<Self, MergeError> {
        let mut file = File::create(path)
            .map_err(|e| MergeError::io(format!("create output '{}'", path.display()), e))?;

        let header = provisional_header(target);
        file.write_all(&header)
            .map_err(|e| MergeError::io("write output header", e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            bytes_written: HEADER_LEN,
            committed: false,
        })
    }

    /// Append payload bytes after the current write position.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), MergeError> {
        self.file
            .write_all(buf)
            .map_err(|e| MergeError::io("write output payload", e))?;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }

    /// Total bytes written so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite a little-endian u32 at an absolute offset, then restore
    /// the write position to the end of the file.
    pub fn patch_u32_at(&mut self, offset: u64, value: u32) -> Result<(), MergeError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| MergeError::io("seek output", e))?;
        self.file
            .write_all(&value.to_le_bytes())
            .map_err(|e| MergeError::io("patch output header", e))?;
        self.file
            .seek(SeekFrom::End(0))
            .map_err(|e| MergeError::io("seek output", e))?;
        Ok(())
    }

    /// Flush buffered writes to the OS and the disk.
    pub fn sync(&mut self) -> Result<(), MergeError> {
        self.file
            .sync_all()
            .map_err(|e| MergeError::io("sync output", e))
    }

    /// Mark the file complete so it survives drop. Returns its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.path.clone()
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn provisional_header(target: &TargetProfile) -> [u8; HEADER_LEN as usize] {
    let mut header = [0u8; HEADER_LEN as usize];
    header[0..4].copy_from_slice(b"RIFF");
    // Size fields stay zero until finalization.
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&target.channels.to_le_bytes());
    header[24..28].copy_from_slice(&target.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&(target.byte_rate() as u32).to_le_bytes());
    header[32..34].copy_from_slice(&(target.block_align() as u16).to_le_bytes());
    header[34..36].copy_from_slice(&target.bits_per_sample.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header
}
