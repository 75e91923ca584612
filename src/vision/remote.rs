//! HTTP facial-emotion classifier.
//!
//! Posts the frame as a base64 JPEG and expects the FER-style answer: one
//! entry per detected face, each with a label -> probability map.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::capture::Frame;
use super::scorer::{EmotionScorer, ScoreError};
use crate::nudge::EmotionScores;

pub struct HttpScorer {
    url: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    frame: u64,
    width: u32,
    height: u32,
    format: &'a str,
    image: String,
}

#[derive(Deserialize)]
struct FaceResult {
    #[serde(rename = "box", default)]
    _bbox: Vec<f32>,
    #[serde(default)]
    emotions: HashMap<String, f32>,
}

impl HttpScorer {
    pub fn new(url: &str, timeout: Duration, api_key: Option<String>) -> Result<Self, ScoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoreError::Request(format!("client error: {}", e)))?;
        Ok(Self {
            url: url.to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmotionScorer for HttpScorer {
    fn id(&self) -> String {
        "http".to_string()
    }

    async fn score(&self, frame: &Frame) -> Result<Option<EmotionScores>, ScoreError> {
        let jpeg = frame.to_jpeg()?;
        let (width, height) = frame.image.dimensions();
        let body = ScoreRequest {
            frame: frame.index,
            width,
            height,
            format: "jpeg",
            image: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, jpeg),
        };

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(api_key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ScoreError::Timeout
            } else {
                ScoreError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let faces: Vec<FaceResult> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ScoreError::Timeout
            } else {
                ScoreError::InvalidResponse(e.to_string())
            }
        })?;

        Ok(faces
            .into_iter()
            .next()
            .map(|face| face.emotions.into_iter().collect::<EmotionScores>())
            .filter(|scores| !scores.is_empty()))
    }
}
