//! Emotion scorers: turn a frame into an emotion-score mapping.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::capture::{CaptureError, Frame};
use super::config::ScorerConfig;
use super::remote::HttpScorer;
use crate::nudge::{Emotion, EmotionScores};

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("scorer request failed: {0}")]
    Request(String),
    #[error("scorer timed out")]
    Timeout,
    #[error("scorer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid scorer response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Frame(#[from] CaptureError),
}

#[async_trait]
pub trait EmotionScorer: Send + Sync {
    fn id(&self) -> String;

    /// Scores for the first face in `frame`; `None` when no face was found.
    async fn score(&self, frame: &Frame) -> Result<Option<EmotionScores>, ScoreError>;
}

pub fn build_scorer(config: &ScorerConfig) -> Result<Arc<dyn EmotionScorer>, ScoreError> {
    match config {
        ScorerConfig::Random { seed } => Ok(Arc::new(match seed {
            Some(seed) => RandomScorer::seeded(*seed),
            None => RandomScorer::new(),
        })),
        ScorerConfig::Http {
            url,
            timeout_ms,
            api_key,
            api_key_env,
        } => {
            let api_key = crate::config::resolve_api_key(api_key, api_key_env);
            Ok(Arc::new(HttpScorer::new(
                url,
                Duration::from_millis(*timeout_ms),
                api_key,
            )?))
        }
    }
}

// ── Random Scorer ──────────────────────────────────────────

/// Stand-in for a real classifier: every frame shows a face, and the face
/// is almost always happy.
///
/// Raw ranges are happy 0.7–0.9, sad 0.0–0.3, angry 0.0–0.2,
/// surprised 0.0–0.2, neutral 0.1–0.4, normalized to sum to 1.
pub struct RandomScorer {
    rng: Mutex<StdRng>,
}

const RANGES: [(Emotion, f32, f32); 5] = [
    (Emotion::Happy, 0.7, 0.9),
    (Emotion::Sad, 0.0, 0.3),
    (Emotion::Angry, 0.0, 0.2),
    (Emotion::Surprised, 0.0, 0.2),
    (Emotion::Neutral, 0.1, 0.4),
];

impl RandomScorer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&self) -> EmotionScores {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        RANGES
            .iter()
            .map(|(emotion, low, high)| (emotion.as_str(), rng.gen_range(*low..*high)))
            .collect::<EmotionScores>()
            .normalized()
    }
}

impl Default for RandomScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmotionScorer for RandomScorer {
    fn id(&self) -> String {
        "random".to_string()
    }

    async fn score(&self, _frame: &Frame) -> Result<Option<EmotionScores>, ScoreError> {
        Ok(Some(self.draw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank_frame() -> Frame {
        Frame::new(0, RgbImage::new(2, 2))
    }

    #[tokio::test]
    async fn random_scores_are_normalized_and_happy() {
        let scorer = RandomScorer::seeded(3);
        for _ in 0..50 {
            let scores = scorer.score(&blank_frame()).await.unwrap().unwrap();
            let total: f32 = scores.iter().map(|(_, s)| s).sum();
            assert!((total - 1.0).abs() < 1e-5, "total was {}", total);
            assert_eq!(
                scores.dominant().map(|(e, _)| e),
                Some(Emotion::Happy),
                "Happy's floor is above every other ceiling"
            );
        }
    }

    #[tokio::test]
    async fn same_seed_same_scores() {
        let a = RandomScorer::seeded(11);
        let b = RandomScorer::seeded(11);
        let frame = blank_frame();
        assert_eq!(
            a.score(&frame).await.unwrap(),
            b.score(&frame).await.unwrap()
        );
    }

    #[test]
    fn builds_random_scorer_from_config() {
        let scorer = build_scorer(&ScorerConfig::Random { seed: Some(1) }).unwrap();
        assert_eq!(scorer.id(), "random");
    }
}
