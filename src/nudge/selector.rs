//! Cooldown-gated, per-user response selection.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use super::catalog::ResponseCatalog;
use super::config::NudgeConfig;
use super::cooldown::{Clock, CooldownTracker, SystemClock};
use super::emotion::{Emotion, EmotionScores};
use super::NudgeError;

/// Said when the catalog somehow has nothing at all to offer.
const LAST_RESORT: &str = "How are you really feeling?";

// ── Nudge ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeOutcome {
    /// Dominant emotion passed threshold and cooldown; trigger recorded.
    Triggered,
    /// No scores, or none for a known emotion.
    NoDetection,
    /// Dominant score below `min_confidence`.
    LowConfidence,
    /// Same (user, emotion) triggered within the cooldown period.
    CoolingDown,
}

/// Result of one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nudge {
    pub text: String,
    /// Catalog category the phrase was requested from.
    pub emotion: Emotion,
    pub dominant: Option<Emotion>,
    /// Score of the dominant emotion, 0.0 without a detection.
    pub confidence: f32,
    pub outcome: NudgeOutcome,
}

impl Nudge {
    pub fn is_triggered(&self) -> bool {
        self.outcome == NudgeOutcome::Triggered
    }
}

// ── Selector ───────────────────────────────────────────────

pub struct NudgeSelector<R = StdRng> {
    config: NudgeConfig,
    catalog: ResponseCatalog,
    cooldowns: CooldownTracker,
    rng: R,
    clock: Arc<dyn Clock>,
}

impl NudgeSelector<StdRng> {
    /// Default catalog, entropy-seeded randomness, wall clock.
    pub fn new(config: NudgeConfig) -> Result<Self, NudgeError> {
        Self::with_parts(
            config,
            ResponseCatalog::default(),
            StdRng::from_entropy(),
            Arc::new(SystemClock),
        )
    }

    /// Default catalog and wall clock with reproducible phrase choice.
    pub fn seeded(config: NudgeConfig, seed: u64) -> Result<Self, NudgeError> {
        Self::with_parts(
            config,
            ResponseCatalog::default(),
            StdRng::seed_from_u64(seed),
            Arc::new(SystemClock),
        )
    }
}

impl<R: Rng> NudgeSelector<R> {
    pub fn with_parts(
        config: NudgeConfig,
        catalog: ResponseCatalog,
        rng: R,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NudgeError> {
        let cooldown = config.cooldown()?;
        Ok(Self {
            config,
            catalog,
            cooldowns: CooldownTracker::new(cooldown),
            rng,
            clock,
        })
    }

    /// Phrase for `scores`, localized to `language` where possible.
    pub fn select(
        &mut self,
        scores: Option<&EmotionScores>,
        language: &str,
        user_id: &str,
    ) -> String {
        self.evaluate(scores, language, user_id).text
    }

    pub fn evaluate(
        &mut self,
        scores: Option<&EmotionScores>,
        language: &str,
        user_id: &str,
    ) -> Nudge {
        let now = self.clock.now();
        self.evaluate_at(scores, language, user_id, now)
    }

    /// Run the selection policy with an explicit timestamp.
    pub fn evaluate_at(
        &mut self,
        scores: Option<&EmotionScores>,
        language: &str,
        user_id: &str,
        now: Duration,
    ) -> Nudge {
        let dominant = scores.and_then(EmotionScores::dominant);

        let Some((emotion, confidence)) = dominant else {
            debug!("[Nudge] user={} no detection", user_id);
            return self.neutral(language, None, 0.0, NudgeOutcome::NoDetection);
        };

        if confidence < self.config.min_confidence {
            debug!(
                "[Nudge] user={} {} at {:.2} below threshold {:.2}",
                user_id, emotion, confidence, self.config.min_confidence
            );
            return self.neutral(
                language,
                Some(emotion),
                confidence,
                NudgeOutcome::LowConfidence,
            );
        }

        if !self.cooldowns.should_trigger(user_id, emotion, now) {
            debug!("[Nudge] user={} {} cooling down", user_id, emotion);
            return self.neutral(
                language,
                Some(emotion),
                confidence,
                NudgeOutcome::CoolingDown,
            );
        }

        self.cooldowns.record_trigger(user_id, emotion, now);
        debug!(
            "[Nudge] user={} triggered {} ({:.0}%) lang={}",
            user_id,
            emotion,
            confidence * 100.0,
            language
        );
        Nudge {
            text: self.pick(language, emotion),
            emotion,
            dominant: Some(emotion),
            confidence,
            outcome: NudgeOutcome::Triggered,
        }
    }

    pub fn add_phrase(&mut self, emotion: Emotion, phrase: impl Into<String>) {
        self.catalog.add_phrase(emotion, phrase);
    }

    pub fn add_language<I, P, S>(&mut self, language: &str, responses: I)
    where
        I: IntoIterator<Item = (Emotion, P)>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog.add_language(language, responses);
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    fn neutral(
        &mut self,
        language: &str,
        dominant: Option<Emotion>,
        confidence: f32,
        outcome: NudgeOutcome,
    ) -> Nudge {
        Nudge {
            text: self.pick(language, Emotion::Neutral),
            emotion: Emotion::Neutral,
            dominant,
            confidence,
            outcome,
        }
    }

    fn pick(&mut self, language: &str, emotion: Emotion) -> String {
        self.catalog
            .phrases_for(language, emotion)
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| LAST_RESORT.to_string())
    }
}

// ── Shared Handle ──────────────────────────────────────────

/// Cloneable handle for several sessions driving one selector.
///
/// The lock spans the whole cooldown check and record, so two callers for
/// the same (user, emotion) can never both pass the check.
#[derive(Clone)]
pub struct SharedNudgeSelector {
    inner: Arc<Mutex<NudgeSelector>>,
}

impl SharedNudgeSelector {
    pub fn new(selector: NudgeSelector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(selector)),
        }
    }

    pub fn evaluate(&self, scores: Option<&EmotionScores>, language: &str, user_id: &str) -> Nudge {
        self.with(|s| s.evaluate(scores, language, user_id))
    }

    /// Run `f` with exclusive access to the selector.
    pub fn with<T>(&self, f: impl FnOnce(&mut NudgeSelector) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}
