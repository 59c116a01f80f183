//! High score records and the stores that keep them.
//!
//! Stores are key-value style: the ranked table is serialized as one JSON
//! blob under [`HIGH_SCORES_KEY`]. A store that fails never stops a game;
//! the session decides how to recover.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Key the ranked table is stored under
pub const HIGH_SCORES_KEY: &str = "HighScores";

/// Name recorded when the player leaves the name empty
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

impl HighScoreEntry {
    pub fn new(name: impl Into<String>, score: u32, timestamp: DateTime<Utc>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            name
        };
        Self {
            id: Uuid::new_v4(),
            name,
            score,
            timestamp,
        }
    }
}

/// Table shown before anything has been saved
pub fn sample_scores(now: DateTime<Utc>) -> Vec<HighScoreEntry> {
    vec![
        HighScoreEntry::new("Player 1", 120, now),
        HighScoreEntry::new("Player 2", 85, now - ChronoDuration::days(1)),
        HighScoreEntry::new("Player 3", 70, now - ChronoDuration::days(2)),
    ]
}

/// Scores sorted best first, capped at `capacity` entries
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    entries: Vec<HighScoreEntry>,
    capacity: usize,
}

impl RankedTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn from_entries(entries: Vec<HighScoreEntry>, capacity: usize) -> Self {
        let mut table = Self { entries, capacity };
        table.rank();
        table
    }

    /// Add an entry, returning its zero-based rank if it made the table
    pub fn insert(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let id = entry.id;
        self.entries.push(entry);
        self.rank();
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    // Stable sort: earlier entries win ties
    fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }
}

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score data is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence collaborator for the ranked table
pub trait ScoreStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load_ranked_scores(&self) -> Result<Option<Vec<HighScoreEntry>>, ScoreStoreError>;

    fn save_ranked_scores(&mut self, entries: &[HighScoreEntry]) -> Result<(), ScoreStoreError>;
}

/// In-process key-value store holding serialized blobs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw blob access, mostly for tests that need corrupt data
    pub fn insert_raw(&mut self, key: impl Into<String>, blob: impl Into<String>) {
        self.blobs.insert(key.into(), blob.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl ScoreStore for MemoryStore {
    fn load_ranked_scores(&self) -> Result<Option<Vec<HighScoreEntry>>, ScoreStoreError> {
        self.blobs
            .get(HIGH_SCORES_KEY)
            .map(|blob| serde_json::from_str(blob))
            .transpose()
            .map_err(ScoreStoreError::from)
    }

    fn save_ranked_scores(&mut self, entries: &[HighScoreEntry]) -> Result<(), ScoreStoreError> {
        let blob = serde_json::to_string(entries)?;
        self.blobs.insert(HIGH_SCORES_KEY.to_string(), blob);
        Ok(())
    }
}

/// Key-value store persisted as one JSON object on disk. Other keys in the
/// file are preserved on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Option<BTreeMap<String, serde_json::Value>>, ScoreStoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

impl ScoreStore for JsonFileStore {
    fn load_ranked_scores(&self) -> Result<Option<Vec<HighScoreEntry>>, ScoreStoreError> {
        let Some(mut map) = self.read_map()? else {
            return Ok(None);
        };
        map.remove(HIGH_SCORES_KEY)
            .map(serde_json::from_value)
            .transpose()
            .map_err(ScoreStoreError::from)
    }

    fn save_ranked_scores(&mut self, entries: &[HighScoreEntry]) -> Result<(), ScoreStoreError> {
        // An unreadable file is replaced rather than blocking the save
        let mut map = self.read_map().ok().flatten().unwrap_or_default();
        map.insert(HIGH_SCORES_KEY.to_string(), serde_json::to_value(entries)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}
