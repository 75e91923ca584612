//! Detector session: polls frames, scores them and voices nudges.

use crate::event_log::{EventLog, EventRecord};
use crate::nudge::{Nudge, SharedNudgeSelector};
use crate::tts::{SpeechError, SpeechService};
use crate::vision::capture::FrameSource;
use crate::vision::config::VisionConfig;
use crate::vision::scorer::EmotionScorer;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters for one session run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub frames: u64,
    pub detections: u64,
    pub triggered: u64,
    pub capture_failures: u64,
    pub score_failures: u64,
    pub speech_failures: u64,
    pub log_failures: u64,
}

/// Stops a running session after its current frame.
#[derive(Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

pub struct DetectorSession {
    user_id: String,
    language: String,
    config: VisionConfig,
    source: Box<dyn FrameSource>,
    scorer: Arc<dyn EmotionScorer>,
    selector: SharedNudgeSelector,
    speech: Option<SpeechService>,
    event_log: Option<EventLog>,
    running: Arc<AtomicBool>,
}

impl DetectorSession {
    pub fn new(
        user_id: impl Into<String>,
        language: impl Into<String>,
        config: VisionConfig,
        source: Box<dyn FrameSource>,
        scorer: Arc<dyn EmotionScorer>,
        selector: SharedNudgeSelector,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            language: language.into(),
            config,
            source,
            scorer,
            selector,
            speech: None,
            event_log: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_speech(mut self, speech: SpeechService) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_event_log(mut self, event_log: EventLog) -> Self {
        self.event_log = Some(event_log);
        self
    }

    /// Handle for stopping the session from another task. Stopping before
    /// `run` is called makes `run` return immediately.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.running.clone(),
        }
    }

    /// Run until the source ends, the stop handle fires, or capture keeps
    /// failing. Waits for queued speech before returning.
    pub async fn run(mut self) -> SessionReport {
        let mut report = SessionReport::default();
        let mut pending: Vec<JoinHandle<Result<(), SpeechError>>> = Vec::new();
        let mut consecutive_failures = 0u32;
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let pause = Duration::from_millis(self.config.announce_pause_ms);

        info!(
            "[Vision] Session started for {} (lang={}, scorer={})",
            self.user_id,
            self.language,
            self.scorer.id()
        );

        while self.running.load(Ordering::Relaxed) {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => {
                    consecutive_failures = 0;
                    frame
                }
                Ok(None) => {
                    info!("[Vision] Frame source ended");
                    break;
                }
                Err(e) => {
                    report.capture_failures += 1;
                    consecutive_failures += 1;
                    warn!("[Vision] Capture failed: {}", e);
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        warn!(
                            "[Vision] {} consecutive capture failures, stopping",
                            consecutive_failures
                        );
                        break;
                    }
                    tokio::time::sleep(poll).await;
                    continue;
                }
            };
            report.frames += 1;

            let scores = match self.scorer.score(&frame).await {
                Ok(scores) => scores,
                Err(e) => {
                    report.score_failures += 1;
                    warn!("[Vision] Scoring frame {} failed: {}", frame.index, e);
                    None
                }
            };
            if scores.as_ref().and_then(|s| s.dominant()).is_some() {
                report.detections += 1;
            }

            let nudge = self
                .selector
                .evaluate(scores.as_ref(), &self.language, &self.user_id);

            if nudge.is_triggered() {
                report.triggered += 1;
                info!(
                    "[Vision] Detected: {} {} ({:.0}% confidence) -> {}",
                    nudge.emotion.emoji(),
                    nudge.emotion,
                    nudge.confidence * 100.0,
                    nudge.text
                );
                self.record(&nudge, &mut report);
                if let Some(speech) = &self.speech {
                    pending.push(speech.speak(
                        nudge.text.clone(),
                        &self.language,
                        nudge.dominant.map(|e| (e, nudge.confidence)),
                    ));
                }
                tokio::time::sleep(pause).await;
            } else {
                debug!("[Vision] Frame {}: {:?}", frame.index, nudge.outcome);
            }

            reap_finished(&mut pending, &mut report).await;
            tokio::time::sleep(poll).await;
        }

        self.source.release();
        for handle in pending {
            count_speech(handle.await, &mut report);
        }
        self.running.store(false, Ordering::Relaxed);
        info!("[Vision] Session stopped: {:?}", report);
        report
    }

    fn record(&self, nudge: &Nudge, report: &mut SessionReport) {
        let Some(log) = &self.event_log else {
            return;
        };
        let record = EventRecord::now(
            self.user_id.as_str(),
            nudge.emotion,
            nudge.text.as_str(),
            nudge.confidence,
        );
        if let Err(e) = log.append(&record) {
            report.log_failures += 1;
            warn!("[Vision] Event log write failed: {}", e);
        }
    }
}

async fn reap_finished(
    pending: &mut Vec<JoinHandle<Result<(), SpeechError>>>,
    report: &mut SessionReport,
) {
    let mut still_running = Vec::with_capacity(pending.len());
    for handle in pending.drain(..) {
        if handle.is_finished() {
            count_speech(handle.await, report);
        } else {
            still_running.push(handle);
        }
    }
    *pending = still_running;
}

fn count_speech(
    result: Result<Result<(), SpeechError>, tokio::task::JoinError>,
    report: &mut SessionReport,
) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(_)) => report.speech_failures += 1,
        Err(e) => {
            report.speech_failures += 1;
            warn!("[Speech] Task panicked or was cancelled: {}", e);
        }
    }
}
