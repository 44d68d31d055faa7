//! Per-day JSONL activity log: one file per local calendar date.
//!
//! Each line is a self-contained JSON object, either an observation
//! (`{"ts", "app", "idle"}`) or a wake marker (`{"ts", "event": "wake",
//! "sleep_seconds"}`). Lines are assembled in memory and written with a single
//! `write_all` so a reader tailing the file never sees a partial record.
//!
//! The target file is recomputed on every append from the record's own
//! timestamp, so a daemon running past midnight rolls into the next day's file
//! without any explicit rotation step.

#![allow(missing_docs)]

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TrackerError};

/// Fixed tag carried by wake records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTag {
    Wake,
}

/// One line of the daily log.
///
/// Kinds are told apart by the presence of `app`, never by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityRecord {
    Observation {
        ts: DateTime<Utc>,
        app: String,
        #[serde(default)]
        idle: bool,
    },
    Wake {
        ts: DateTime<Utc>,
        event: EventTag,
        sleep_seconds: u64,
    },
}

impl ActivityRecord {
    #[must_use]
    pub fn observation(ts: DateTime<Utc>, app: impl Into<String>, idle: bool) -> Self {
        Self::Observation {
            ts,
            app: app.into(),
            idle,
        }
    }

    #[must_use]
    pub const fn wake(ts: DateTime<Utc>, sleep_seconds: u64) -> Self {
        Self::Wake {
            ts,
            event: EventTag::Wake,
            sleep_seconds,
        }
    }

    #[must_use]
    pub const fn ts(&self) -> DateTime<Utc> {
        match self {
            Self::Observation { ts, .. } | Self::Wake { ts, .. } => *ts,
        }
    }

    /// The app name, or `None` for wake markers.
    #[must_use]
    pub fn app(&self) -> Option<&str> {
        match self {
            Self::Observation { app, .. } => Some(app),
            Self::Wake { .. } => None,
        }
    }

    /// Local calendar date this record belongs to.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.ts().with_timezone(&Local).date_naive()
    }
}

/// Destination for emitted records.
pub trait RecordSink {
    fn append(&mut self, record: &ActivityRecord) -> Result<()>;
}

impl RecordSink for Vec<ActivityRecord> {
    fn append(&mut self, record: &ActivityRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Result of reading one day's file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayReadout {
    pub records: Vec<ActivityRecord>,
    /// Non-blank lines that failed to parse.
    pub skipped: usize,
}

/// Directory of `YYYY-MM-DD.jsonl` files.
#[derive(Debug, Clone)]
pub struct DailyLog {
    dir: PathBuf,
}

impl DailyLog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// All records for `day` in append order. A missing file is an empty day.
    pub fn read(&self, day: NaiveDate) -> Result<Vec<ActivityRecord>> {
        self.read_report(day).map(|readout| readout.records)
    }

    /// Like [`read`](Self::read), also counting lines that could not be parsed.
    pub fn read_report(&self, day: NaiveDate) -> Result<DayReadout> {
        let path = self.path_for(day);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(DayReadout::default()),
            Err(err) => return Err(TrackerError::io(&path, err)),
        };

        let mut readout = DayReadout::default();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityRecord>(line) {
                Ok(record) => readout.records.push(record),
                Err(err) => {
                    readout.skipped += 1;
                    tracing::warn!(
                        path = %path.display(),
                        line = idx + 1,
                        error = %err,
                        "skipping unreadable log line"
                    );
                }
            }
        }
        Ok(readout)
    }
}

impl RecordSink for DailyLog {
    fn append(&mut self, record: &ActivityRecord) -> Result<()> {
        let path = self.path_for(record.local_date());
        if record.app().is_some_and(str::is_empty) {
            return Err(TrackerError::LogRecord {
                path,
                details: "observation with empty app name".to_string(),
            });
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| TrackerError::io(parent, source))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TrackerError::io(&path, source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| TrackerError::io(&path, source))
    }
}

// ──────────────────────── tests ────────────────────────
