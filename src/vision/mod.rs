pub mod capture;
pub mod config;
pub mod remote;
pub mod scorer;
pub mod watcher;

pub use capture::{build_source, CaptureError, Frame, FrameSource, ImageDirSource, SyntheticSource};
pub use config::{ScorerConfig, SourceConfig, VisionConfig};
pub use remote::HttpScorer;
pub use scorer::{build_scorer, EmotionScorer, RandomScorer, ScoreError};
pub use watcher::{DetectorSession, SessionReport, StopHandle};
