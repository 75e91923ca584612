use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ── Command Provider Config ────────────────────────────

/// External TTS program. `{text}`, `{lang}` and `{rate}` in `args` are
/// replaced per utterance; `{rate}` is `base_rate` scaled by the speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_base_rate")]
    pub base_rate: u32,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            args: vec![
                "-v".to_string(),
                "{lang}".to_string(),
                "-s".to_string(),
                "{rate}".to_string(),
                "{text}".to_string(),
            ],
            base_rate: default_base_rate(),
        }
    }
}

fn default_base_rate() -> u32 {
    175 // espeak words per minute
}

// ── Top-Level Speech Config ────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// "command" or "silent"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Scale speech rate by the detected emotion.
    #[serde(default = "default_true")]
    pub emotion_modulation: bool,
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_provider(),
            command: CommandConfig::default(),
            max_concurrent: default_max_concurrent(),
            emotion_modulation: true,
            base_speed: default_base_speed(),
        }
    }
}

fn default_provider() -> String {
    "silent".to_string()
}

fn default_max_concurrent() -> usize {
    1
}

fn default_base_speed() -> f32 {
    1.0
}
