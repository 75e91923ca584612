//! Nudge selection: which canned phrase to say for a frame's emotion scores.
//!
//! The [`NudgeSelector`] combines a confidence threshold, a per-user
//! cooldown and a localized [`ResponseCatalog`]. It never fails; every gap
//! degrades to a neutral or English phrase.

pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod emotion;
pub mod selector;


pub use catalog::{normalize_language, ResponseCatalog, FALLBACK_LANGUAGE};
pub use config::NudgeConfig;
pub use cooldown::{Clock, CooldownTracker, ManualClock, SystemClock};
pub use emotion::{Emotion, EmotionScores};
pub use selector::{Nudge, NudgeOutcome, NudgeSelector, SharedNudgeSelector};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NudgeError {
    #[error("unknown emotion label: {0}")]
    UnknownEmotion(String),
    #[error("invalid nudge config: {0}")]
    InvalidConfig(String),
}
