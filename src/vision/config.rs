//! Vision configuration: frame source, scorer and loop pacing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Solid placeholder frames, for running without a camera.
    Synthetic {
        #[serde(default = "default_width")]
        width: u32,
        #[serde(default = "default_height")]
        height: u32,
        /// Stop after this many frames; unbounded when absent.
        #[serde(default)]
        max_frames: Option<u64>,
    },
    /// PNG/JPEG files from a directory, in file-name order.
    Directory {
        path: PathBuf,
        #[serde(default)]
        looped: bool,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic {
            width: default_width(),
            height: default_height(),
            max_frames: None,
        }
    }
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScorerConfig {
    /// Uniform-random scores skewed towards "happy".
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Facial-emotion classifier behind an HTTP endpoint.
    Http {
        url: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        api_key_env: Option<String>,
    },
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig::Random { seed: None }
    }
}

fn default_timeout_ms() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
    /// Delay between two frames.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Extra delay after a spoken nudge.
    #[serde(default = "default_announce_pause_ms")]
    pub announce_pause_ms: u64,
    /// Consecutive capture failures tolerated before the session ends.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            scorer: ScorerConfig::default(),
            poll_interval_ms: default_poll_interval_ms(),
            announce_pause_ms: default_announce_pause_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_announce_pause_ms() -> u64 {
    3_000
}

fn default_max_consecutive_failures() -> u32 {
    10
}
