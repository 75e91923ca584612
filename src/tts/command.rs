//! External-program TTS provider (espeak-ng, say, piper wrappers...).

use super::config::CommandConfig;
use super::interface::{SpeechError, SpeechParams, SpeechSynthesizer};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

pub struct CommandSpeaker {
    config: CommandConfig,
}

impl CommandSpeaker {
    pub fn from_config(config: &CommandConfig) -> Option<Self> {
        if config.program.trim().is_empty() {
            return None;
        }
        Some(Self {
            config: config.clone(),
        })
    }

    /// Argument list for one utterance with placeholders substituted.
    pub fn render_args(&self, text: &str, params: &SpeechParams) -> Vec<String> {
        let rate = ((self.config.base_rate as f32) * params.speed).round() as u32;
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{lang}", &params.language)
                    .replace("{rate}", &rate.to_string())
                    .replace("{text}", text)
            })
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeaker {
    fn id(&self) -> String {
        "command".to_string()
    }

    async fn is_available(&self) -> bool {
        let program = Path::new(&self.config.program);
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }

    async fn speak(&self, text: &str, params: SpeechParams) -> Result<(), SpeechError> {
        let args = self.render_args(text, &params);
        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| {
                SpeechError::Unavailable(format!(
                    "failed to spawn '{}': {}",
                    self.config.program, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::SynthesisFailed(format!(
                "'{}' exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_placeholders() {
        let speaker = CommandSpeaker::from_config(&CommandConfig::default()).unwrap();
        let params = SpeechParams {
            language: "hi".to_string(),
            speed: 0.8,
            emotion: None,
        };
        assert_eq!(
            speaker.render_args("Keep smiling!", &params),
            vec!["-v", "hi", "-s", "140", "Keep smiling!"]
        );
    }

    #[test]
    fn empty_program_is_rejected() {
        let config = CommandConfig {
            program: "  ".to_string(),
            ..CommandConfig::default()
        };
        assert!(CommandSpeaker::from_config(&config).is_none());
    }

    #[tokio::test]
    async fn missing_program_reports_unavailable() {
        let config = CommandConfig {
            program: "/nonexistent/emotion-nudge-tts".to_string(),
            args: vec![],
            base_rate: 175,
        };
        let speaker = CommandSpeaker::from_config(&config).unwrap();
        assert!(!speaker.is_available().await);
        let err = speaker.speak("hello", SpeechParams::default()).await.unwrap_err();
        assert!(matches!(err, SpeechError::Unavailable(_)), "got {:?}", err);
    }
}
