//! Append-only CSV log of spoken nudges.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

const HEADER: [&str; 5] = ["timestamp", "username", "emotion", "response", "confidence"];

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("event log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("event log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the log. Field order matches the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: String,
    pub username: String,
    pub emotion: String,
    pub response: String,
    pub confidence: f32,
}

impl EventRecord {
    /// Record stamped with the current time.
    pub fn now(
        username: impl Into<String>,
        emotion: impl ToString,
        response: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            username: username.into(),
            emotion: emotion.to_string(),
            response: response.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Open the log at `path`, creating the directory and header if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EventLogError> {
        let log = Self { path: path.into() };
        if let Some(parent) = log.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !log.path.exists() {
            write_header_only(&log.path)?;
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &EventRecord) -> Result<(), EventLogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Every row in file order. A missing file reads as empty.
    pub fn records(&self) -> Result<Vec<EventRecord>, EventLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn records_for(&self, username: &str) -> Result<Vec<EventRecord>, EventLogError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.username == username)
            .collect())
    }

    /// Drop every row for `username`. Returns the number removed.
    pub fn clear_user(&self, username: &str) -> Result<usize, EventLogError> {
        let records = self.records()?;
        let before = records.len();
        let kept: Vec<EventRecord> = records
            .into_iter()
            .filter(|r| r.username != username)
            .collect();

        let tmp = self.path.with_extension("csv.tmp");
        write_header_only(&tmp)?;
        {
            let file = OpenOptions::new().append(true).open(&tmp)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            for record in &kept {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(before - kept.len())
    }
}

fn write_header_only(path: &Path) -> Result<(), EventLogError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    writer.flush()?;
    Ok(())
}
