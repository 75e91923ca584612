use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::nudge::Emotion;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech provider not found: {0}")]
    ProviderNotFound(String),
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("speech config error: {0}")]
    ConfigError(String),
    #[error("speech unavailable: {0}")]
    Unavailable(String),
    #[error("speech queue closed")]
    QueueClosed,
}

// ── Synthesis Parameters ───────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    /// Language code handed to the engine (e.g. "en", "hi", "kn").
    pub language: String,
    /// 1.0 = engine default rate.
    pub speed: f32,
    pub emotion: Option<Emotion>,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            speed: 1.0,
            emotion: None,
        }
    }
}

// ── Provider Trait ──────────────────────────────────────

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Unique identifier for this provider (e.g., "command", "silent")
    fn id(&self) -> String;

    /// Check if the provider can currently produce audio
    async fn is_available(&self) -> bool;

    /// Speak `text` and return once playback has finished
    async fn speak(&self, text: &str, params: SpeechParams) -> Result<(), SpeechError>;
}
