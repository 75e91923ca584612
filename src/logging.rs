use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info,reqwest=warn,hyper=warn,hyper_util=warn".to_string()
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    // Err means a subscriber is already installed
    let _ = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_lowercase() {
        let config: LogConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.level.starts_with("info"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&LogConfig::default());
        init(&LogConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
        });
    }
}
