use super::interface::{SpeechError, SpeechParams, SpeechSynthesizer};
use async_trait::async_trait;
use tracing::info;

/// Silent provider: logs the utterance instead of playing audio.
///
/// Used on machines without an audio stack and as the default until a
/// real engine is configured.
pub struct SilentSpeaker;

impl SilentSpeaker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SilentSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for SilentSpeaker {
    fn id(&self) -> String {
        "silent".to_string()
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn speak(&self, text: &str, params: SpeechParams) -> Result<(), SpeechError> {
        info!(
            "[Speech] (silent, lang={}, speed={:.2}) {}",
            params.language, params.speed, text
        );
        Ok(())
    }
}
