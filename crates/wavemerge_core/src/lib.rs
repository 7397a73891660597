//! WAV Merge Core - streaming PCM merge engine
//!
//! Merges an ordered list of WAV files into one container, normalizing
//! mismatched formats through an external transcoder and applying
//! sample-accurate linear crossfades at each splice point. All payload
//! I/O is streamed through fixed-size buffers; inputs are never loaded
//! whole.
//!
//! The crate contains no transport or UI dependencies. Embedders drive
//! it through [`orchestrator::MergeJob`]:
//!
//! ```no_run
//! use wavemerge_core::orchestrator::MergeJob;
//!
//! let result = MergeJob::new("merged.wav")
//!     .input("intro.wav")
//!     .input("body.wav")
//!     .fade_ms(250)
//!     .run()
//!     .unwrap();
//! println!("wrote {:.3}s", result.duration_secs);
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod finalizer;
pub mod inspector;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod planner;

#[cfg(test)]
pub(crate) mod test_wav;

pub use errors::MergeError;
pub use models::{
    FormatDescriptor, JobPhase, MergeOptions, MergeResult, MergeWarning, TargetProfile,
};
pub use orchestrator::{CancelHandle, MergeJob};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
