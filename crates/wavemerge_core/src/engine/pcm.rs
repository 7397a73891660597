//! PCM sample codecs and the crossfade blend.
//!
//! Samples are decoded into `i64` in their native domain: 8-bit audio is
//! unsigned (0..=255, silence at 128), wider depths are signed
//! little-endian. Blending is linear, so the unsigned offset survives the
//! weighted sum unchanged.

/// Bytes per sample for a bit depth.
pub(crate) fn bytes_per_sample(bits: u16) -> usize {
    bits as usize / 8
}

/// Inclusive value range for a bit depth, in the decode domain.
pub(crate) fn sample_range(bits: u16) -> (i64, i64) {
    match bits {
        8 => (0, 255),
        16 => (i16::MIN as i64, i16::MAX as i64),
        24 => (-(1 << 23), (1 << 23) - 1),
        _ => (i32::MIN as i64, i32::MAX as i64),
    }
}

/// Decode one sample from little-endian bytes.
pub(crate) fn decode_sample(bytes: &[u8], bits: u16) -> i64 {
    match bits {
        8 => bytes[0] as i64,
        16 => i16::from_le_bytes([bytes[0], bytes[1]]) as i64,
        24 => {
            let raw = (bytes[0] as i32) | ((bytes[1] as i32) << 8) | ((bytes[2] as i32) << 16);
            // Sign-extend from bit 23.
            ((raw << 8) >> 8) as i64
        }
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
    }
}

/// Encode one sample into little-endian bytes, clamping to the depth's range.
pub(crate) fn encode_sample(value: i64, bits: u16, out: &mut [u8]) {
    let (min, max) = sample_range(bits);
    let value = value.clamp(min, max);
    match bits {
        8 => out[0] = value as u8,
        16 => out[0..2].copy_from_slice(&(value as i16).to_le_bytes()),
        24 => {
            let raw = value as i32;
            out[0] = raw as u8;
            out[1] = (raw >> 8) as u8;
            out[2] = (raw >> 16) as u8;
        }
        _ => out[0..4].copy_from_slice(&(value as i32).to_le_bytes()),
    }
}

/// Blend `fade_frames` frames of `left` tail audio into `right` head audio.
///
/// Frame `k` weights the outgoing side at `1 - k/F` and the incoming side
/// at `k/F`, per channel, rounded to the nearest integer and clamped to the
/// depth's range. Both slices must hold exactly `fade_frames` frames.
pub(crate) fn crossfade(
    left: &[u8],
    right: &[u8],
    fade_frames: usize,
    channels: u16,
    bits: u16,
) -> Vec<u8> {
    let bps = bytes_per_sample(bits);
    let frame_len = channels as usize * bps;
    debug_assert_eq!(left.len(), fade_frames * frame_len);
    debug_assert_eq!(right.len(), fade_frames * frame_len);

    let mut out = vec![0u8; fade_frames * frame_len];
    for k in 0..fade_frames {
        let weight = k as f64 / fade_frames as f64;
        for ch in 0..channels as usize {
            let off = k * frame_len + ch * bps;
            let a = decode_sample(&left[off..off + bps], bits) as f64;
            let b = decode_sample(&right[off..off + bps], bits) as f64;
            let blended = (a * (1.0 - weight) + b * weight).round() as i64;
            encode_sample(blended, bits, &mut out[off..off + bps]);
        }
    }
    out
}
