pub mod command;
pub mod config;
pub mod emotion_tts;
pub mod interface;
pub mod manager;
pub mod queue;
pub mod silent;

pub use config::{CommandConfig, SpeechConfig};
pub use interface::{SpeechError, SpeechParams, SpeechSynthesizer};
pub use manager::SpeechService;
