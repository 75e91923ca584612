//! Per-user, per-emotion trigger cooldowns and the clocks that drive them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::emotion::Emotion;

// ── Clock ──────────────────────────────────────────────────

/// Time source for cooldown decisions.
///
/// Values are offsets from an arbitrary epoch; only differences matter, so
/// any source works as long as one tracker sees a single clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Hand-driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Cooldown Tracker ───────────────────────────────────────

/// Last accepted trigger per (user, emotion).
///
/// Entries are created on first trigger and never removed, so the map
/// grows with the number of distinct users seen by the process.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    cooldown: Duration,
    last_triggers: HashMap<String, HashMap<Emotion, Duration>>,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_triggers: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// True when (user, emotion) has never triggered, or its last trigger
    /// is at least one cooldown period before `now`.
    pub fn should_trigger(&self, user_id: &str, emotion: Emotion, now: Duration) -> bool {
        match self.last_trigger(user_id, emotion) {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.cooldown,
        }
    }

    /// Overwrite the last trigger time for (user, emotion).
    pub fn record_trigger(&mut self, user_id: &str, emotion: Emotion, now: Duration) {
        self.last_triggers
            .entry(user_id.to_string())
            .or_default()
            .insert(emotion, now);
    }

    pub fn last_trigger(&self, user_id: &str, emotion: Emotion) -> Option<Duration> {
        self.last_triggers
            .get(user_id)
            .and_then(|emotions| emotions.get(&emotion))
            .copied()
    }

    /// Number of users with at least one recorded trigger.
    pub fn len(&self) -> usize {
        self.last_triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_triggers.is_empty()
    }
}
