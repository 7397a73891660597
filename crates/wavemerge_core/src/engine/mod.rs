//! Streaming merge engine.

pub(crate) mod pcm;

mod merge;
mod sink;

pub use merge::{merge_streams, MergeInput, MergeStats};
pub use sink::OutputSink;

pub(crate) use sink::{DATA_SIZE_OFFSET, HEADER_LEN, RIFF_SIZE_OFFSET};
