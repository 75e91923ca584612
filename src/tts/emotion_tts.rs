//! Emotion-driven speech rate.
//!
//! Softer nudges for sad or fearful faces are read a little slower, upbeat
//! ones a little faster, so the voice matches the phrase it carries.

use crate::nudge::Emotion;

/// Multiplier for speech speed (1.0 = no change).
pub fn speed_factor(emotion: Emotion, confidence: f32) -> f32 {
    let base = match emotion {
        Emotion::Happy => 1.10,
        Emotion::Surprised => 1.05,
        Emotion::Angry => 0.90, // calm voice for calming phrases
        Emotion::Sad => 0.85,
        Emotion::Fear => 0.88,
        Emotion::Disgust => 0.95,
        Emotion::Neutral => 1.0,
    };

    // Stronger detections get the full adjustment, weak ones half of it
    let scale = 0.5 + confidence.clamp(0.0, 1.0) * 0.5;
    1.0 + (base - 1.0) * scale
}

/// Apply the emotion factor to a base speed, clamped to a sane range.
pub fn apply_speed(base_speed: f32, emotion: Emotion, confidence: f32) -> f32 {
    (base_speed * speed_factor(emotion, confidence)).clamp(0.5, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_returns_no_change() {
        assert!((speed_factor(Emotion::Neutral, 0.9) - 1.0).abs() < 0.001);
    }

    #[test]
    fn happy_speeds_up_and_sad_slows_down() {
        assert!(speed_factor(Emotion::Happy, 0.8) > 1.0);
        assert!(speed_factor(Emotion::Sad, 0.8) < 1.0);
    }

    #[test]
    fn confident_detection_amplifies_effect() {
        let mild = speed_factor(Emotion::Sad, 0.1);
        let strong = speed_factor(Emotion::Sad, 1.0);
        assert!(
            strong < mild,
            "Strong sadness should slow speech more: strong={}, mild={}",
            strong,
            mild
        );
    }

    #[test]
    fn apply_speed_clamps_values() {
        assert!(apply_speed(5.0, Emotion::Happy, 1.0) <= 2.0);
        assert!(apply_speed(0.1, Emotion::Sad, 1.0) >= 0.5);
    }
}
