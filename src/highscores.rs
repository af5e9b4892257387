//! Score history
//!
//! Append-only text file, one line per finished run:
//! `<score> pts - <YYYY-MM-DD HH:MM>`. Older files also carry a player name
//! in front (`<name> - <score> pts - <timestamp>`); both forms are read.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of recent records shown
pub const MAX_HISTORY_LINES: usize = 10;

const FIELD_SEPARATOR: &str = " - ";
const POINTS_SUFFIX: &str = " pts";
/// Local wall-clock time, minute precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors from reading or writing the score file
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A line that is not a score record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseScoreError {
    #[error("expected `<score> pts - <timestamp>`")]
    MissingFields,
    #[error("score field `{0}` does not end in \" pts\"")]
    MissingPoints(String),
    #[error("invalid score `{0}`")]
    InvalidScore(String),
    #[error("empty timestamp")]
    EmptyTimestamp,
}

/// A single finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Present only in legacy lines
    pub name: Option<String>,
    pub score: u64,
    /// `YYYY-MM-DD HH:MM`
    pub timestamp: String,
}

impl ScoreRecord {
    /// Record for a run finishing now, stamped with the local time
    pub fn now(score: u64) -> Self {
        Self {
            name: None,
            score,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}{}", name, FIELD_SEPARATOR)?;
        }
        write!(
            f,
            "{}{}{}{}",
            self.score, POINTS_SUFFIX, FIELD_SEPARATOR, self.timestamp
        )
    }
}

impl FromStr for ScoreRecord {
    type Err = ParseScoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        // Timestamp and score are the last two fields; anything before is the name
        let mut fields = line.rsplitn(3, FIELD_SEPARATOR);
        let timestamp = fields.next().unwrap_or_default().trim();
        let points = fields.next().ok_or(ParseScoreError::MissingFields)?.trim();
        let name = fields.next().map(|n| n.trim().to_string());

        if timestamp.is_empty() {
            return Err(ParseScoreError::EmptyTimestamp);
        }
        let score = points
            .strip_suffix(POINTS_SUFFIX)
            .ok_or_else(|| ParseScoreError::MissingPoints(points.to_string()))?
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseScoreError::InvalidScore(points.to_string()))?;

        Ok(Self {
            name,
            score,
            timestamp: timestamp.to_string(),
        })
    }
}

/// The score file on disk
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    path: PathBuf,
}

impl ScoreHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ScoreError {
        ScoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one record, creating the file and its directory if needed
    pub fn append(&self, record: &ScoreRecord) -> Result<(), ScoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", record).map_err(|e| self.io_error(e))?;
        log::info!("Score saved: {}", record);
        Ok(())
    }

    /// The last `MAX_HISTORY_LINES` parseable records, oldest first.
    /// A missing file is an empty history; malformed lines are skipped.
    pub fn recent(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records: Vec<ScoreRecord> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|line| match line.parse::<ScoreRecord>() {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping score line {:?}: {}", line, e);
                    None
                }
            })
            .collect();
        let skip = records.len().saturating_sub(MAX_HISTORY_LINES);
        Ok(records.split_off(skip))
    }

    /// Best score among the recent records
    pub fn top_score(&self) -> Result<Option<u64>, ScoreError> {
        Ok(self.recent()?.iter().map(|r| r.score).max())
    }
}
