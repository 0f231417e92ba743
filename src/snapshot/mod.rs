//! Snapshot store: per-topic, per-date embedding matrices
//!
//! Layout on disk:
//! - one directory per collection date (`<root>/<YYYY-MM-DD>/`)
//! - one JSON file per topic inside it, holding an N x D matrix of f32
//!
//! Topic names are encoded in filenames with spaces replaced by
//! underscores; the mapping is reversible.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A dated collection of embedding vectors for one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSnapshot {
    pub topic: String,
    pub date: NaiveDate,
    /// Source file the matrix was loaded from, if any
    #[serde(skip)]
    pub path: Option<PathBuf>,
    /// N x D matrix, row per sample
    pub vectors: Vec<Vec<f32>>,
}

impl EmbeddingSnapshot {
    pub fn new(topic: impl Into<String>, date: NaiveDate, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            topic: topic.into(),
            date,
            path: None,
            vectors,
        }
    }

    /// Number of samples (rows)
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding dimension, or None for an empty snapshot
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }

    /// Source path as a display string ("" when constructed in memory)
    pub fn source(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

/// Map a topic name to its snapshot file name
pub fn topic_file_name(topic: &str) -> String {
    format!("{}.json", topic.replace(' ', "_"))
}

/// Recover a topic name from a snapshot file stem
pub fn topic_from_stem(stem: &str) -> String {
    stem.replace('_', " ")
}

/// Read-only store over the dated snapshot directory tree
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all collection dates, sorted ascending
    ///
    /// Directories that do not parse as YYYY-MM-DD are ignored.
    pub fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        if !self.root.exists() {
            return Err(Error::MalformedSnapshot(format!(
                "snapshot directory not found: {}",
                self.root.display()
            )));
        }

        let mut dates = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match NaiveDate::parse_from_str(&name, "%Y-%m-%d") {
                Ok(date) => dates.push(date),
                Err(_) => debug!("Skipping non-date directory {:?}", name),
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }

    /// Topics that have a snapshot on the given date
    pub fn topics_on(&self, date: NaiveDate) -> Result<BTreeSet<String>> {
        let dir = self.date_dir(date);
        let mut topics = BTreeSet::new();
        if !dir.exists() {
            return Ok(topics);
        }

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                topics.insert(topic_from_stem(stem));
            }
        }
        Ok(topics)
    }

    /// Topics present on both dates, sorted
    pub fn common_topics(&self, old_date: NaiveDate, new_date: NaiveDate) -> Result<Vec<String>> {
        let old_topics = self.topics_on(old_date)?;
        let new_topics = self.topics_on(new_date)?;
        Ok(old_topics.intersection(&new_topics).cloned().collect())
    }

    /// Load one topic's snapshot for a date
    pub fn load(&self, topic: &str, date: NaiveDate) -> Result<EmbeddingSnapshot> {
        let path = self.snapshot_path(topic, date);
        if !path.exists() {
            return Err(Error::MissingSnapshot {
                topic: topic.to_string(),
                date: date.to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let vectors: Vec<Vec<f32>> = serde_json::from_str(&content).map_err(|e| {
            Error::MalformedSnapshot(format!("{}: {}", path.display(), e))
        })?;

        // Matrix must be rectangular
        if let Some(width) = vectors.first().map(Vec::len) {
            if let Some(bad) = vectors.iter().position(|row| row.len() != width) {
                return Err(Error::MalformedSnapshot(format!(
                    "{}: row {} has {} columns, expected {}",
                    path.display(),
                    bad,
                    vectors[bad].len(),
                    width
                )));
            }
        }

        debug!(
            "Loaded snapshot for '{}' on {}: {} x {}",
            topic,
            date,
            vectors.len(),
            vectors.first().map_or(0, Vec::len)
        );

        Ok(EmbeddingSnapshot {
            topic: topic.to_string(),
            date,
            path: Some(path),
            vectors,
        })
    }

    /// Write a snapshot (fixtures and replay tooling; production snapshots
    /// come from the embedding pipeline)
    pub fn save(&self, snapshot: &EmbeddingSnapshot) -> Result<PathBuf> {
        let dir = self.date_dir(snapshot.date);
        std::fs::create_dir_all(&dir)?;
        let path = self.snapshot_path(&snapshot.topic, snapshot.date);
        let content = serde_json::to_string(&snapshot.vectors)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn date_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format("%Y-%m-%d").to_string())
    }

    fn snapshot_path(&self, topic: &str, date: NaiveDate) -> PathBuf {
        self.date_dir(date).join(topic_file_name(topic))
    }
}

/// Consecutive (old, new) date pairs available in the store
pub fn consecutive_pairs(dates: &[NaiveDate]) -> Vec<(NaiveDate, NaiveDate)> {
    if dates.len() < 2 {
        warn!("Not enough snapshot dates to compute drift (need at least 2)");
        return Vec::new();
    }
    dates.windows(2).map(|w| (w[0], w[1])).collect()
}
