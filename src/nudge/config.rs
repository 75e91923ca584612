use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::NudgeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NudgeConfig {
    /// Minimum dominant-emotion score for a non-neutral response (0.0–1.0).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Seconds between two accepted triggers of the same (user, emotion).
    #[serde(default = "default_response_cooldown")]
    pub response_cooldown: f64,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            response_cooldown: default_response_cooldown(),
        }
    }
}

fn default_min_confidence() -> f32 {
    0.4
}

fn default_response_cooldown() -> f64 {
    5.0
}

impl NudgeConfig {
    pub fn validate(&self) -> Result<(), NudgeError> {
        if !self.min_confidence.is_finite() || !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(NudgeError::InvalidConfig(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !self.response_cooldown.is_finite() || self.response_cooldown < 0.0 {
            return Err(NudgeError::InvalidConfig(format!(
                "response_cooldown must be a non-negative number of seconds, got {}",
                self.response_cooldown
            )));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Result<Duration, NudgeError> {
        self.validate()?;
        Duration::try_from_secs_f64(self.response_cooldown)
            .map_err(|e| NudgeError::InvalidConfig(format!("response_cooldown: {}", e)))
    }
}
