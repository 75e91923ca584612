use super::command::CommandSpeaker;
use super::config::SpeechConfig;
use super::emotion_tts;
use super::interface::{SpeechError, SpeechParams, SpeechSynthesizer};
use super::queue::SpeechQueue;
use super::silent::SilentSpeaker;

use crate::nudge::Emotion;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ── SpeechService ──────────────────────────────────────

/// Fire-and-forget speech dispatch.
///
/// Callers get a `JoinHandle` with the outcome but never have to await it;
/// failures are logged from inside the task either way.
#[derive(Clone)]
pub struct SpeechService {
    provider: Arc<dyn SpeechSynthesizer>,
    queue: Arc<SpeechQueue>,
    enabled: bool,
    emotion_modulation: bool,
    base_speed: f32,
}

impl SpeechService {
    pub fn new(provider: Arc<dyn SpeechSynthesizer>, config: &SpeechConfig) -> Self {
        Self {
            provider,
            queue: Arc::new(SpeechQueue::new(config.max_concurrent)),
            enabled: config.enabled,
            emotion_modulation: config.emotion_modulation,
            base_speed: config.base_speed,
        }
    }

    /// Build the configured provider.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let provider = Self::build_provider(config)?;
        info!("[Speech] Using provider: {}", provider.id());
        Ok(Self::new(provider, config))
    }

    fn build_provider(config: &SpeechConfig) -> Result<Arc<dyn SpeechSynthesizer>, SpeechError> {
        match config.provider.as_str() {
            "silent" => Ok(Arc::new(SilentSpeaker::new())),
            "command" => CommandSpeaker::from_config(&config.command)
                .map(|p| Arc::new(p) as Arc<dyn SpeechSynthesizer>)
                .ok_or_else(|| {
                    SpeechError::ConfigError("command provider needs a program".to_string())
                }),
            other => Err(SpeechError::ProviderNotFound(other.to_string())),
        }
    }

    pub fn provider_id(&self) -> String {
        self.provider.id()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn is_available(&self) -> bool {
        self.enabled && self.provider.is_available().await
    }

    /// Parameters for an utterance of a nudge drawn for `emotion`.
    pub fn params_for(&self, language: &str, emotion: Option<(Emotion, f32)>) -> SpeechParams {
        let speed = match emotion {
            Some((emotion, confidence)) if self.emotion_modulation => {
                emotion_tts::apply_speed(self.base_speed, emotion, confidence)
            }
            _ => self.base_speed,
        };
        SpeechParams {
            language: language.to_string(),
            speed,
            emotion: emotion.map(|(e, _)| e),
        }
    }

    /// Queue `text` for playback and return immediately.
    pub fn speak(
        &self,
        text: String,
        language: &str,
        emotion: Option<(Emotion, f32)>,
    ) -> JoinHandle<Result<(), SpeechError>> {
        let params = self.params_for(language, emotion);
        if !self.enabled {
            debug!("[Speech] Disabled, skipping: {}", text);
            return tokio::spawn(async { Ok(()) });
        }

        let provider = self.provider.clone();
        self.queue.enqueue(move || async move {
            let result = provider.speak(&text, params).await;
            if let Err(ref e) = result {
                warn!("[Speech] {} failed: {}", provider.id(), e);
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSpeaker {
        spoken: Mutex<Vec<(String, SpeechParams)>>,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSpeaker {
        fn id(&self) -> String {
            "recording".to_string()
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn speak(&self, text: &str, params: SpeechParams) -> Result<(), SpeechError> {
            if self.fail {
                return Err(SpeechError::SynthesisFailed("no audio device".to_string()));
            }
            self.spoken.lock().unwrap().push((text.to_string(), params));
            Ok(())
        }
    }

    #[tokio::test]
    async fn speak_reaches_provider_with_language() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let service = SpeechService::new(speaker.clone(), &SpeechConfig::default());

        service
            .speak("Keep smiling!".to_string(), "kn", Some((Emotion::Happy, 0.9)))
            .await
            .unwrap()
            .unwrap();

        let spoken = speaker.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].0, "Keep smiling!");
        assert_eq!(spoken[0].1.language, "kn");
        assert!(spoken[0].1.speed > 1.0, "Happy nudges are read faster");
    }

    #[tokio::test]
    async fn provider_failure_is_reported_through_handle() {
        let speaker = Arc::new(RecordingSpeaker {
            fail: true,
            ..RecordingSpeaker::default()
        });
        let service = SpeechService::new(speaker, &SpeechConfig::default());

        let result = service.speak("hi".to_string(), "en", None).await.unwrap();
        assert!(matches!(result, Err(SpeechError::SynthesisFailed(_))));
    }

    #[tokio::test]
    async fn disabled_service_skips_provider() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let config = SpeechConfig {
            enabled: false,
            ..SpeechConfig::default()
        };
        let service = SpeechService::new(speaker.clone(), &config);

        assert!(!service.is_enabled());
        service.speak("hi".to_string(), "en", None).await.unwrap().unwrap();
        assert!(speaker.spoken.lock().unwrap().is_empty());
        assert!(!service.is_available().await);
    }

    #[test]
    fn modulation_can_be_turned_off() {
        let config = SpeechConfig {
            emotion_modulation: false,
            ..SpeechConfig::default()
        };
        let service = SpeechService::new(Arc::new(SilentSpeaker::new()), &config);
        let params = service.params_for("en", Some((Emotion::Sad, 1.0)));
        assert_eq!(params.speed, 1.0);
        assert_eq!(params.emotion, Some(Emotion::Sad));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let config = SpeechConfig {
            provider: "gtts".to_string(),
            ..SpeechConfig::default()
        };
        assert!(matches!(
            SpeechService::from_config(&config),
            Err(SpeechError::ProviderNotFound(_))
        ));
    }
}
