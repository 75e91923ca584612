//! Wires config, stores, selector and speech into one application handle.

use tracing::{info, warn};

use crate::auth::{AuthError, UserStore};
use crate::config::{AppConfig, ConfigError};
use crate::event_log::{EventLog, EventLogError, EventRecord};
use crate::nudge::{normalize_language, EmotionScores, Nudge, SharedNudgeSelector};
use crate::tts::{SpeechError, SpeechService};
use crate::vision::{build_scorer, build_source, CaptureError, DetectorSession, ScoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    EventLog(#[from] EventLogError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

pub struct App {
    config: AppConfig,
    selector: SharedNudgeSelector,
    users: UserStore,
    event_log: EventLog,
    speech: SpeechService,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let selector = SharedNudgeSelector::new(config.build_selector()?);
        let users = UserStore::open(config.users_path());
        let event_log = EventLog::open(config.event_log_path())?;
        let speech = SpeechService::from_config(&config.speech)?;
        info!(
            "[App] Data in {}, speech via {} (enabled={})",
            config.data_dir().display(),
            speech.provider_id(),
            speech.is_enabled()
        );
        Ok(Self {
            config,
            selector,
            users,
            event_log,
            speech,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn selector(&self) -> &SharedNudgeSelector {
        &self.selector
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        Ok(self.users.register(username, password)?)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<(), AppError> {
        Ok(self.users.authenticate(username, password)?)
    }

    /// `language`, or the configured default, normalized.
    pub fn language_or_default(&self, language: Option<&str>) -> String {
        normalize_language(language.unwrap_or(&self.config.default_language))
    }

    /// One selection outside a detector session. Triggered nudges are logged;
    /// a failed log write is reported but never costs the caller the nudge.
    pub fn select(
        &self,
        scores: Option<&EmotionScores>,
        language: Option<&str>,
        username: &str,
    ) -> Result<Nudge, AppError> {
        let language = self.language_or_default(language);
        let nudge = self.selector.evaluate(scores, &language, username);
        if nudge.is_triggered() {
            let record =
                EventRecord::now(username, nudge.emotion, nudge.text.as_str(), nudge.confidence);
            if let Err(e) = self.event_log.append(&record) {
                warn!("[App] Event log write failed: {}", e);
            }
        }
        Ok(nudge)
    }

    /// Detector session for an authenticated user.
    pub fn session(
        &self,
        username: &str,
        language: Option<&str>,
    ) -> Result<DetectorSession, AppError> {
        let vision = &self.config.vision;
        let source = build_source(&vision.source)?;
        let scorer = build_scorer(&vision.scorer)?;
        Ok(DetectorSession::new(
            username,
            self.language_or_default(language),
            vision.clone(),
            source,
            scorer,
            self.selector.clone(),
        )
        .with_speech(self.speech.clone())
        .with_event_log(self.event_log.clone()))
    }

    pub fn history(&self, username: &str) -> Result<Vec<EventRecord>, AppError> {
        Ok(self.event_log.records_for(username)?)
    }

    pub fn clear_history(&self, username: &str) -> Result<usize, AppError> {
        let removed = self.event_log.clear_user(username)?;
        info!("[App] Cleared {} records for {}", removed, username);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nudge::{Emotion, NudgeOutcome};
    use crate::vision::{ScorerConfig, SourceConfig, VisionConfig};
    use tempfile::TempDir;

    fn app(tmp: &TempDir) -> App {
        App::new(AppConfig {
            data_dir: Some(tmp.path().to_path_buf()),
            seed: Some(1),
            vision: VisionConfig {
                source: SourceConfig::Synthetic {
                    width: 4,
                    height: 4,
                    max_frames: Some(2),
                },
                scorer: ScorerConfig::Random { seed: Some(4) },
                poll_interval_ms: 0,
                announce_pause_ms: 0,
                ..VisionConfig::default()
            },
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn register_login_and_history() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);
        app.register("alice", "pw").unwrap();
        app.login("alice", "pw").unwrap();
        assert!(matches!(
            app.login("alice", "nope"),
            Err(AppError::Auth(AuthError::WrongPassword))
        ));

        let scores: EmotionScores = [("sad", 0.8f32)].into_iter().collect();
        let first = app.select(Some(&scores), Some("HI"), "alice").unwrap();
        let second = app.select(Some(&scores), Some("hi"), "alice").unwrap();
        assert_eq!(first.outcome, NudgeOutcome::Triggered);
        assert_eq!(second.outcome, NudgeOutcome::CoolingDown);

        let history = app.history("alice").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].emotion, Emotion::Sad.to_string());

        assert_eq!(app.clear_history("alice").unwrap(), 1);
        assert!(app.history("alice").unwrap().is_empty());
    }

    #[test]
    fn unwritable_log_still_returns_the_nudge() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);
        let log_path = app.event_log().path().to_path_buf();
        std::fs::remove_file(&log_path).unwrap();
        std::fs::create_dir(&log_path).unwrap();

        let scores: EmotionScores = [("happy", 0.9f32)].into_iter().collect();
        let first = app.select(Some(&scores), None, "alice").unwrap();
        assert_eq!(first.outcome, NudgeOutcome::Triggered);
        assert_eq!(first.emotion, Emotion::Happy);
        assert_ne!(first.text, "");

        let second = app.select(Some(&scores), None, "alice").unwrap();
        assert_eq!(second.outcome, NudgeOutcome::CoolingDown);
    }

    #[tokio::test]
    async fn session_runs_on_configured_source() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);
        let report = app.session("alice", None).unwrap().run().await;
        assert_eq!(report.frames, 2);
        assert_eq!(report.detections, 2);
        // Random scores can land under the threshold; at most one passes the cooldown
        assert!(report.triggered <= 1);
        assert_eq!(app.history("alice").unwrap().len() as u64, report.triggered);
    }

    #[test]
    fn unknown_speech_provider_fails_startup() {
        let tmp = TempDir::new().unwrap();
        let mut config = AppConfig {
            data_dir: Some(tmp.path().to_path_buf()),
            ..AppConfig::default()
        };
        config.speech.provider = "cloud".to_string();
        assert!(matches!(App::new(config), Err(AppError::Speech(_))));
    }
}
