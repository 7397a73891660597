//! Merge options.

use serde::{Deserialize, Serialize};

/// Options for a merge job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Crossfade length at each splice point, in milliseconds.
    #[serde(default)]
    pub fade_duration_ms: u32,

    /// I/O buffer size in bytes. Purely a chunking parameter: the output
    /// bytes must be identical for any value.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Whether mismatched inputs are normalized (true) or rejected (false).
    #[serde(default = "default_true")]
    pub auto_convert: bool,
}

fn default_buffer_size() -> usize {
    131_072
}

fn default_true() -> bool {
    true
}

/// Smallest accepted buffer size.
const MIN_BUFFER_SIZE: usize = 4096;

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fade_duration_ms: 0,
            buffer_size: default_buffer_size(),
            auto_convert: true,
        }
    }
}

impl MergeOptions {
    /// Return a copy with the buffer size coerced to a power of two,
    /// floored at 4 KiB.
    pub fn normalized(mut self) -> Self {
        self.buffer_size = self.buffer_size.max(MIN_BUFFER_SIZE).next_power_of_two();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = MergeOptions::default();
        assert_eq!(opts.fade_duration_ms, 0);
        assert_eq!(opts.buffer_size, 131_072);
        assert!(opts.auto_convert);
    }

    #[test]
    fn normalized_rounds_buffer_up_to_power_of_two() {
        let opts = MergeOptions {
            buffer_size: 100_000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(opts.buffer_size, 131_072);

        let tiny = MergeOptions {
            buffer_size: 17,
            ..Default::default()
        }
        .normalized();
        assert_eq!(tiny.buffer_size, 4096);
    }

    #[test]
    fn normalized_keeps_power_of_two() {
        let opts = MergeOptions {
            buffer_size: 32_768,
            ..Default::default()
        }
        .normalized();
        assert_eq!(opts.buffer_size, 32_768);
    }
}
