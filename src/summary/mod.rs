//! Daily summary: the merge/join over the latest drift reports
//!
//! Aggregation republishes the statuses already decided by the drift
//! computers; it performs no new statistical computation. The summary is
//! persisted as JSON and as a CSV with identical columns, named by the
//! summary date so re-runs overwrite deterministically.

use crate::drift::{ConceptStatus, SemanticStatus};
use crate::error::{Error, Result};
use crate::report::{ConceptDriftReport, ReportKind, ReportRepository, SemanticDriftReport};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Serialize a missing dimension as the legacy "N/A" sentinel and accept
/// either "N/A" or null when reading summaries back.
mod na {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(v) => v.serialize(ser),
            None => ser.serialize_str("N/A"),
        }
    }

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        let value = serde_json::Value::deserialize(de)?;
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(ref s) if s == "N/A" => Ok(None),
            other => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
        }
    }
}

/// One topic's joined drift view for the summary date
///
/// A topic missing one of the two underlying reports still gets a row;
/// that dimension is simply absent, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub topic: String,
    pub date: NaiveDate,
    #[serde(with = "na")]
    pub semantic_status: Option<SemanticStatus>,
    pub semantic_score: Option<f64>,
    pub cosine_drift: Option<f64>,
    pub jsd_drift: Option<f64>,
    #[serde(with = "na")]
    pub concept_status: Option<ConceptStatus>,
    pub test_acc: Option<f64>,
    pub test_f1: Option<f64>,
    pub accuracy_drop: Option<f64>,
}

impl SummaryRow {
    fn from_reports(
        topic: &str,
        date: NaiveDate,
        semantic: Option<&SemanticDriftReport>,
        concept: Option<&ConceptDriftReport>,
    ) -> Self {
        Self {
            topic: topic.to_string(),
            date,
            semantic_status: semantic.map(|s| s.status),
            semantic_score: semantic.map(|s| s.drift_score),
            cosine_drift: semantic.map(|s| s.cosine_drift),
            jsd_drift: semantic.map(|s| s.jsd_drift),
            concept_status: concept.map(|c| c.status),
            test_acc: concept.map(|c| c.test_acc),
            test_f1: concept.map(|c| c.test_f1),
            accuracy_drop: concept.map(|c| c.accuracy_drop),
        }
    }
}

/// One aggregation run's output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub generated_at: DateTime<Utc>,
    /// The most recent date present in any underlying report, not
    /// necessarily the processing date
    pub date: NaiveDate,
    pub rows: Vec<SummaryRow>,
}

/// Join the latest semantic and concept reports into one row per topic.
///
/// `latest_date` is the maximum new_date across both report kinds; when
/// the repository is empty it falls back to the current processing date.
pub fn aggregate(repo: &dyn ReportRepository) -> Result<DailySummary> {
    let mut sem_idx: BTreeMap<(String, NaiveDate), SemanticDriftReport> = BTreeMap::new();
    let mut con_idx: BTreeMap<(String, NaiveDate), ConceptDriftReport> = BTreeMap::new();

    for report in repo.list(ReportKind::Semantic)? {
        if let Some(r) = report.as_semantic() {
            sem_idx.insert((r.topic.clone(), r.new_date), r.clone());
        }
    }
    for report in repo.list(ReportKind::Concept)? {
        if let Some(r) = report.as_concept() {
            con_idx.insert((r.topic.clone(), r.new_date), r.clone());
        }
    }

    let topics: BTreeSet<&String> = sem_idx.keys().chain(con_idx.keys()).map(|(t, _)| t).collect();
    let latest_date = sem_idx
        .keys()
        .chain(con_idx.keys())
        .map(|(_, d)| *d)
        .max()
        .unwrap_or_else(|| Utc::now().date_naive());

    let rows: Vec<SummaryRow> = topics
        .into_iter()
        .map(|topic| {
            let key = (topic.clone(), latest_date);
            SummaryRow::from_reports(topic, latest_date, sem_idx.get(&key), con_idx.get(&key))
        })
        .collect();

    info!(
        "Aggregated {} topic(s) for {}",
        rows.len(),
        latest_date
    );

    Ok(DailySummary {
        generated_at: Utc::now(),
        date: latest_date,
        rows,
    })
}

/// One point of a topic's trend across stored summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub semantic_score: Option<f64>,
    pub cosine_drift: Option<f64>,
    pub jsd_drift: Option<f64>,
    pub accuracy_drop: Option<f64>,
    #[serde(with = "na")]
    pub concept_status: Option<ConceptStatus>,
}

const SUMMARY_PREFIX: &str = "drift_summary_";

/// File store for daily summaries (JSON + CSV per date)
#[derive(Debug, Clone)]
pub struct SummaryStore {
    dir: PathBuf,
}

impl SummaryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist both representations, overwriting any prior run for the date
    pub fn write(&self, summary: &DailySummary) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(&self.dir)?;

        let json_path = self
            .dir
            .join(format!("{}{}.json", SUMMARY_PREFIX, summary.date));
        std::fs::write(&json_path, serde_json::to_string_pretty(summary)?)?;

        let csv_path = self
            .dir
            .join(format!("{}{}.csv", SUMMARY_PREFIX, summary.date));
        self.write_csv(&csv_path, summary)?;

        info!("Summary written to {:?} and {:?}", json_path, csv_path);
        Ok((json_path, csv_path))
    }

    fn write_csv(&self, path: &Path, summary: &DailySummary) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "topic",
            "date",
            "semantic_status",
            "semantic_score",
            "cosine_drift",
            "jsd_drift",
            "concept_status",
            "test_acc",
            "test_f1",
            "accuracy_drop",
        ])?;

        let number = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        for row in &summary.rows {
            writer.write_record([
                row.topic.clone(),
                row.date.to_string(),
                row.semantic_status
                    .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
                number(row.semantic_score),
                number(row.cosine_drift),
                number(row.jsd_drift),
                row.concept_status
                    .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
                number(row.test_acc),
                number(row.test_f1),
                number(row.accuracy_drop),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// All stored summaries, oldest first; malformed files are skipped
    pub fn load_all(&self) -> Result<Vec<DailySummary>> {
        let mut paths = Vec::new();
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(SUMMARY_PREFIX) && name.ends_with(".json") {
                paths.push(path);
            }
        }
        // Dates are zero-padded, so lexicographic order is date order
        paths.sort();

        let mut summaries = Vec::new();
        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping unreadable summary {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str(&content) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Skipping malformed summary {:?}: {}", path, e),
            }
        }
        Ok(summaries)
    }

    /// The most recent stored summary
    pub fn load_latest(&self) -> Result<DailySummary> {
        self.load_all()?
            .pop()
            .ok_or_else(|| Error::NoSummary(self.dir.display().to_string()))
    }

    /// Per-topic trend slice across stored summaries, oldest first
    pub fn topic_history(&self, topic: &str, last: Option<usize>) -> Result<Vec<TrendPoint>> {
        let mut points: Vec<TrendPoint> = self
            .load_all()?
            .into_iter()
            .flat_map(|summary| {
                let date = summary.date;
                summary
                    .rows
                    .into_iter()
                    .filter(|row| row.topic == topic)
                    .map(move |row| TrendPoint {
                        date,
                        semantic_score: row.semantic_score,
                        cosine_drift: row.cosine_drift,
                        jsd_drift: row.jsd_drift,
                        accuracy_drop: row.accuracy_drop,
                        concept_status: row.concept_status,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        if let Some(n) = last {
            let keep = points.len().saturating_sub(n);
            points.drain(..keep);
        }
        Ok(points)
    }
}
