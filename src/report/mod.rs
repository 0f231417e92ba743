//! Drift report types and the report repository boundary
//!
//! Reports are immutable once written, identified by (topic, new_date, kind).
//! The JSON field names are the wire contract consumed by the dashboard and
//! the read API; do not rename them.

mod fs;

pub use fs::FsReportRepository;

use crate::drift::{ConceptStatus, SemanticStatus};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which of the two drift dimensions a report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Semantic,
    Concept,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Concept => "concept",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distributional-distance report for one (topic, date pair)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticDriftReport {
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub old_date: NaiveDate,
    pub new_date: NaiveDate,
    pub old_samples: usize,
    pub new_samples: usize,
    pub cosine_drift: f64,
    pub jsd_drift: f64,
    pub drift_score: f64,
    /// Source path of the old snapshot file
    pub old_snapshot: String,
    /// Source path of the new snapshot file
    pub new_snapshot: String,
    pub status: SemanticStatus,
}

/// Discriminability report for one (topic, date pair)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptDriftReport {
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub old_date: NaiveDate,
    pub new_date: NaiveDate,
    pub old_samples: usize,
    pub new_samples: usize,
    pub train_acc: f64,
    pub test_acc: f64,
    pub train_f1: f64,
    pub test_f1: f64,
    pub accuracy_drop: f64,
    pub status: ConceptStatus,
}

/// Either report kind, as stored in the repository
#[derive(Debug, Clone, PartialEq)]
pub enum DriftReport {
    Semantic(SemanticDriftReport),
    Concept(ConceptDriftReport),
}

impl DriftReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Semantic(_) => ReportKind::Semantic,
            Self::Concept(_) => ReportKind::Concept,
        }
    }

    pub fn topic(&self) -> &str {
        match self {
            Self::Semantic(r) => &r.topic,
            Self::Concept(r) => &r.topic,
        }
    }

    pub fn new_date(&self) -> NaiveDate {
        match self {
            Self::Semantic(r) => r.new_date,
            Self::Concept(r) => r.new_date,
        }
    }

    pub fn as_semantic(&self) -> Option<&SemanticDriftReport> {
        match self {
            Self::Semantic(r) => Some(r),
            Self::Concept(_) => None,
        }
    }

    pub fn as_concept(&self) -> Option<&ConceptDriftReport> {
        match self {
            Self::Concept(r) => Some(r),
            Self::Semantic(_) => None,
        }
    }
}

impl From<SemanticDriftReport> for DriftReport {
    fn from(r: SemanticDriftReport) -> Self {
        Self::Semantic(r)
    }
}

impl From<ConceptDriftReport> for DriftReport {
    fn from(r: ConceptDriftReport) -> Self {
        Self::Concept(r)
    }
}

/// Persistence boundary for drift reports
///
/// The aggregator depends on this trait, never on path conventions.
pub trait ReportRepository {
    /// Store a report, overwriting any prior report with the same identity
    fn put(&self, report: &DriftReport) -> Result<()>;

    /// Fetch one report by identity, None when absent
    fn get(&self, kind: ReportKind, topic: &str, new_date: NaiveDate)
        -> Result<Option<DriftReport>>;

    /// All readable reports of a kind; unreadable files are skipped
    fn list(&self, kind: ReportKind) -> Result<Vec<DriftReport>>;

    /// The report with the greatest new_date for each topic
    fn latest_per_topic(&self, kind: ReportKind) -> Result<BTreeMap<String, DriftReport>> {
        let mut latest: BTreeMap<String, DriftReport> = BTreeMap::new();
        for report in self.list(kind)? {
            let newer = match latest.get(report.topic()) {
                Some(current) => report.new_date() > current.new_date(),
                None => true,
            };
            if newer {
                latest.insert(report.topic().to_string(), report);
            }
        }
        Ok(latest)
    }
}
