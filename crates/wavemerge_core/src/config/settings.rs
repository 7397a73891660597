//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::MergeOptions;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Merge defaults.
    #[serde(default)]
    pub merge: MergeSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Output, temp, and log directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for merged files.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for temporary conversion files.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "merge_output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Default merge behavior, overridable per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Crossfade length at each splice point, in milliseconds.
    #[serde(default)]
    pub fade_duration_ms: u32,

    /// I/O buffer size in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Convert mismatched inputs instead of rejecting them.
    #[serde(default = "default_true")]
    pub auto_convert: bool,

    /// Path to the ffmpeg binary used for conversion.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_buffer_size() -> usize {
    131_072
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            fade_duration_ms: 0,
            buffer_size: default_buffer_size(),
            auto_convert: true,
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

impl MergeSettings {
    /// Translate into per-job merge options.
    pub fn to_options(&self) -> MergeOptions {
        MergeOptions {
            fade_duration_ms: self.fade_duration_ms,
            buffer_size: self.buffer_size,
            auto_convert: self.auto_convert,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter progress lines).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in job logs.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Log debug-level detail in job logs.
    #[serde(default)]
    pub verbose: bool,
}

fn default_progress_step() -> u32 {
    10
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            progress_step: default_progress_step(),
            show_timestamps: true,
            verbose: false,
        }
    }
}

impl LoggingSettings {
    /// Translate into a job logger configuration.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: if self.verbose {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
            compact: self.compact,
            progress_step: self.progress_step,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Merge,
    Logging,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Merge => "merge",
            ConfigSection::Logging => "logging",
        }
    }
}
