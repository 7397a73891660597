//! Test fixtures: synthesized WAV files and a deterministic transcoder.

use std::fs;
use std::path::Path;

use crate::engine::pcm;
use crate::inspector;
use crate::models::TargetProfile;
use crate::normalizer::{TranscodeError, Transcoder};

/// Build a complete canonical WAV byte image (44-byte header + payload).
pub(crate) fn wav_bytes(rate: u32, channels: u16, bits: u16, payload: &[u8]) -> Vec<u8> {
    let block_align = channels as u32 * (bits as u32 / 8);
    let byte_rate = rate * block_align;
    let riff_size = 36 + payload.len() as u32;

    let mut bytes = Vec::with_capacity(44 + payload.len());
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&riff_size.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&(block_align as u16).to_le_bytes());
    bytes.extend_from_slice(&bits.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Write a canonical WAV file.
pub(crate) fn write_wav(path: &Path, rate: u32, channels: u16, bits: u16, payload: &[u8]) {
    fs::write(path, wav_bytes(rate, channels, bits, payload)).unwrap();
}

/// Write a WAV with an odd-sized unknown chunk between `fmt ` and `data`.
pub(crate) fn write_wav_with_junk_chunk(
    path: &Path,
    rate: u32,
    channels: u16,
    bits: u16,
    payload: &[u8],
) {
    let canonical = wav_bytes(rate, channels, bits, payload);

    // Junk chunk: 5-byte body plus a pad byte.
    let mut junk = Vec::new();
    junk.extend_from_slice(b"LIST");
    junk.extend_from_slice(&5u32.to_le_bytes());
    junk.extend_from_slice(b"INFOx");
    junk.push(0); // pad

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&canonical[..36]); // RIFF header + fmt chunk
    bytes.extend_from_slice(&junk);
    bytes.extend_from_slice(&canonical[36..]); // data chunk onward

    let riff_size = (bytes.len() - 8) as u32;
    bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
    fs::write(path, bytes).unwrap();
}

/// Payload of digital silence for the given duration.
pub(crate) fn silence_payload(rate: u32, channels: u16, bits: u16, secs: f64) -> Vec<u8> {
    let frames = (rate as f64 * secs).round() as usize;
    constant_payload(frames, channels, bits, 0)
}

/// Payload holding the same sample value in every channel of every frame.
pub(crate) fn constant_payload(frames: usize, channels: u16, bits: u16, value: i64) -> Vec<u8> {
    let bps = bits as usize / 8;
    let mut payload = vec![0u8; frames * channels as usize * bps];
    for i in 0..(frames * channels as usize) {
        pcm::encode_sample(value, bits, &mut payload[i * bps..(i + 1) * bps]);
    }
    payload
}

/// Deterministic non-silent payload (sawtooth over the sample range).
pub(crate) fn ramp_payload(frames: usize, channels: u16, bits: u16) -> Vec<u8> {
    let bps = bits as usize / 8;
    let (min, max) = pcm::sample_range(bits);
    let span = (max - min) as usize;
    let mut payload = vec![0u8; frames * channels as usize * bps];
    for frame in 0..frames {
        let value = min + ((frame * 37) % span) as i64;
        for ch in 0..channels as usize {
            let i = frame * channels as usize + ch;
            pcm::encode_sample(value, bits, &mut payload[i * bps..(i + 1) * bps]);
        }
    }
    payload
}

/// In-process transcoder that honors the target exactly.
///
/// Rewrites the input as silence at the target profile, preserving the
/// input's duration. Deterministic, no external tools.
pub(crate) struct FakeTranscoder;

impl Transcoder for FakeTranscoder {
    fn transcode(
        &self,
        input: &Path,
        target: &TargetProfile,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let desc = inspector::inspect_file(input)
            .map_err(|e| TranscodeError(format!("unreadable input: {}", e)))?;
        let frames = ((desc.frames() as f64) * (target.sample_rate as f64)
            / (desc.sample_rate as f64))
            .round() as usize;
        let payload =
            constant_payload(frames, target.channels, target.bits_per_sample, 0);
        write_wav(
            output,
            target.sample_rate,
            target.channels,
            target.bits_per_sample,
            &payload,
        );
        Ok(())
    }
}

/// Transcoder that leaves a partial artifact behind and then fails.
pub(crate) struct FailingTranscoder;

impl Transcoder for FailingTranscoder {
    fn transcode(
        &self,
        _input: &Path,
        _target: &TargetProfile,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        fs::write(output, b"partial garbage").unwrap();
        Err(TranscodeError("simulated transcoder crash".to_string()))
    }
}

/// Transcoder that ignores the requested profile (dishonest output).
pub(crate) struct DisobedientTranscoder;

impl Transcoder for DisobedientTranscoder {
    fn transcode(
        &self,
        _input: &Path,
        _target: &TargetProfile,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let payload = silence_payload(8000, 1, 8, 0.1);
        write_wav(output, 8000, 1, 8, &payload);
        Ok(())
    }
}
