//! Emotion labels and per-frame score mappings.
//!
//! Classifiers disagree on label spelling ("surprise" vs "surprised",
//! "joy" vs "happy"), so raw labels are kept as delivered and only mapped
//! onto the fixed [`Emotion`] set when the dominant emotion is computed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::NudgeError;

// ── Emotion ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fear,
    Disgust,
    Neutral,
}

impl Emotion {
    /// Canonical ordering. Ties in dominant-emotion computation go to the
    /// earliest entry.
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
        }
    }

    /// Map a classifier label onto the fixed set. Returns `None` for labels
    /// outside it.
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "happy" | "happiness" | "joy" | "joyful" => Some(Emotion::Happy),
            "sad" | "sadness" => Some(Emotion::Sad),
            "angry" | "anger" => Some(Emotion::Angry),
            "surprised" | "surprise" => Some(Emotion::Surprised),
            "fear" | "fearful" | "scared" => Some(Emotion::Fear),
            "disgust" | "disgusted" => Some(Emotion::Disgust),
            "neutral" | "calm" => Some(Emotion::Neutral),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Surprised => "😲",
            Emotion::Fear => "😨",
            Emotion::Disgust => "🤢",
            Emotion::Neutral => "😐",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::parse_label(s).ok_or_else(|| NudgeError::UnknownEmotion(s.to_string()))
    }
}

// ── Emotion Scores ─────────────────────────────────────────

/// Raw label -> confidence mapping produced for one frame.
///
/// An empty mapping is the "no detection" state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionScores {
    scores: HashMap<String, f32>,
}

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, score: f32) {
        self.scores.insert(label.into(), score);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Highest score among the raw labels that map onto `emotion`.
    pub fn get(&self, emotion: Emotion) -> Option<f32> {
        self.scores
            .iter()
            .filter(|(label, score)| {
                score.is_finite() && Emotion::parse_label(label) == Some(emotion)
            })
            .map(|(_, score)| *score)
            .reduce(f32::max)
    }

    /// Raw labels that do not map onto a known emotion.
    pub fn unknown_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .scores
            .keys()
            .filter(|label| Emotion::parse_label(label).is_none())
            .map(String::as_str)
            .collect();
        labels.sort_unstable();
        labels
    }

    /// The known emotion with the highest score.
    ///
    /// Walks [`Emotion::ALL`] and only replaces the running best on a
    /// strictly greater score, so ties resolve to the canonical order
    /// regardless of map iteration order.
    pub fn dominant(&self) -> Option<(Emotion, f32)> {
        let mut best: Option<(Emotion, f32)> = None;
        for emotion in Emotion::ALL {
            if let Some(score) = self.get(emotion) {
                match best {
                    Some((_, best_score)) if score <= best_score => {}
                    _ => best = Some((emotion, score)),
                }
            }
        }
        best
    }

    /// Scale finite scores so they sum to 1. Left unchanged when the total
    /// is not positive.
    pub fn normalized(&self) -> Self {
        let total: f32 = self.scores.values().filter(|s| s.is_finite()).sum();
        if total <= 0.0 {
            return self.clone();
        }
        Self {
            scores: self
                .scores
                .iter()
                .map(|(label, score)| (label.clone(), score / total))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.scores.iter().map(|(label, score)| (label.as_str(), *score))
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            scores: iter
                .into_iter()
                .map(|(label, score)| (label.into(), score))
                .collect(),
        }
    }
}
