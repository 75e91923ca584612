//! Emotion-aware nudges: pick a short spoken response for the emotion a
//! camera frame shows, without repeating the same nudge to the same user
//! too often.

pub mod app;
pub mod auth;
pub mod config;
pub mod event_log;
pub mod logging;
pub mod nudge;
pub mod tts;
pub mod vision;

pub use app::{App, AppError};
pub use nudge::{Emotion, EmotionScores, Nudge, NudgeConfig, NudgeOutcome, NudgeSelector};
