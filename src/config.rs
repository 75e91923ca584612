//! Application config: one JSON file plus the shared load/save helpers
//! and API-key resolution.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::logging::LogConfig;
use crate::nudge::{Emotion, NudgeConfig, NudgeError, NudgeSelector, ResponseCatalog, SystemClock};
use crate::tts::SpeechConfig;
use crate::vision::VisionConfig;

pub const CONFIG_FILE: &str = "config.json";
pub const USERS_FILE: &str = "users.json";
pub const EVENT_LOG_FILE: &str = "emotion_data.csv";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Nudge(#[from] NudgeError),
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                info!("[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                warn!(
                    "[{}] Failed to parse config {}: {}, using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            info!(
                "[{}] No config file at {}, using defaults",
                label,
                path.display()
            );
            T::default()
        }
    }
}

/// Generic save for any Serde config type.
pub fn save_json_config<T: Serialize>(path: &Path, config: &T, label: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!("[{}] Saved config to {}", label, path.display());
    Ok(())
}

/// Resolve an API key: check the direct `api_key` field first,
/// then fall back to reading the environment variable named in `api_key_env`.
pub fn resolve_api_key(api_key: &Option<String>, api_key_env: &Option<String>) -> Option<String> {
    if let Some(ref key) = api_key {
        if !key.is_empty() {
            return Some(key.clone());
        }
    }
    if let Some(ref env_var) = api_key_env {
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}

/// `<platform data dir>/emotion-nudge`, or `./data` when there is none.
pub fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("emotion-nudge"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

// ── App Config ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the user store and event log live.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Fixed seed for phrase choice; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub nudge: NudgeConfig,
    /// language code -> emotion label -> phrases, merged into the catalog.
    #[serde(default)]
    pub languages: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// emotion label -> extra English phrases.
    #[serde(default)]
    pub extra_phrases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed: None,
            default_language: default_language(),
            nudge: NudgeConfig::default(),
            languages: BTreeMap::new(),
            extra_phrases: BTreeMap::new(),
            speech: SpeechConfig::default(),
            vision: VisionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Self {
        load_json_config(path, "Config")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json_config(path, self, "Config")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir().join(USERS_FILE)
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.data_dir().join(EVENT_LOG_FILE)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.nudge.validate()?;
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::Invalid("default_language is empty".to_string()));
        }
        if self.speech.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "speech.max_concurrent must be at least 1".to_string(),
            ));
        }
        if !self.speech.base_speed.is_finite() || self.speech.base_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speech.base_speed must be positive, got {}",
                self.speech.base_speed
            )));
        }
        Ok(())
    }

    /// Built-in catalog plus configured languages and extra phrases.
    /// Unknown emotion labels are skipped with a warning.
    pub fn build_catalog(&self) -> ResponseCatalog {
        let mut catalog = ResponseCatalog::default();
        for (language, responses) in &self.languages {
            let parsed: Vec<(Emotion, Vec<String>)> = responses
                .iter()
                .filter_map(|(label, phrases)| match Emotion::parse_label(label) {
                    Some(emotion) => Some((emotion, phrases.clone())),
                    None => {
                        warn!("[Config] Ignoring unknown emotion '{}' in language '{}'", label, language);
                        None
                    }
                })
                .collect();
            catalog.add_language(language, parsed);
        }
        for (label, phrases) in &self.extra_phrases {
            match Emotion::parse_label(label) {
                Some(emotion) => {
                    for phrase in phrases {
                        catalog.add_phrase(emotion, phrase.as_str());
                    }
                }
                None => warn!("[Config] Ignoring extra phrases for unknown emotion '{}'", label),
            }
        }
        catalog
    }

    pub fn build_selector(&self) -> Result<NudgeSelector, ConfigError> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(NudgeSelector::with_parts(
            self.nudge.clone(),
            self.build_catalog(),
            rng,
            Arc::new(SystemClock),
        )?)
    }
}
