//! Configuration management.
//!
//! TOML-based configuration with logical sections, atomic file writes
//! (temp file plus rename), and section-level updates that leave the
//! rest of the document untouched.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, MergeSettings, PathSettings, Settings,
};
