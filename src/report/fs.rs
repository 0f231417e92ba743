//! Filesystem-backed report repository
//!
//! One JSON file per report under `<root>/semantic/` and `<root>/concept/`,
//! named `<Topic>_<kind>_drift_<new_date>.json`. Writes overwrite; reads
//! tolerate individually unreadable files.

use super::{ConceptDriftReport, DriftReport, ReportKind, ReportRepository, SemanticDriftReport};
use crate::error::{Error, Result};
use crate::snapshot::topic_file_name;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FsReportRepository {
    root: PathBuf,
}

impl FsReportRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: ReportKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    fn report_path(&self, kind: ReportKind, topic: &str, new_date: NaiveDate) -> PathBuf {
        // Reuse the snapshot topic encoding so "Climate Change" and
        // Climate_Change.json stay one mapping across the system.
        let stem = topic_file_name(topic);
        let stem = stem.trim_end_matches(".json");
        self.kind_dir(kind)
            .join(format!("{}_{}_drift_{}.json", stem, kind.as_str(), new_date))
    }

    fn parse(kind: ReportKind, content: &str) -> Result<DriftReport> {
        let report = match kind {
            ReportKind::Semantic => {
                DriftReport::Semantic(serde_json::from_str::<SemanticDriftReport>(content)?)
            }
            ReportKind::Concept => {
                DriftReport::Concept(serde_json::from_str::<ConceptDriftReport>(content)?)
            }
        };
        Ok(report)
    }
}

impl ReportRepository for FsReportRepository {
    fn put(&self, report: &DriftReport) -> Result<()> {
        let dir = self.kind_dir(report.kind());
        std::fs::create_dir_all(&dir)?;

        let path = self.report_path(report.kind(), report.topic(), report.new_date());
        let content = match report {
            DriftReport::Semantic(r) => serde_json::to_string_pretty(r)?,
            DriftReport::Concept(r) => serde_json::to_string_pretty(r)?,
        };
        std::fs::write(&path, content)?;
        debug!("Saved {} report to {:?}", report.kind(), path);
        Ok(())
    }

    fn get(
        &self,
        kind: ReportKind,
        topic: &str,
        new_date: NaiveDate,
    ) -> Result<Option<DriftReport>> {
        let path = self.report_path(kind, topic, new_date);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let report = Self::parse(kind, &content)
            .map_err(|e| Error::MalformedReport(format!("{}: {}", path.display(), e)))?;
        Ok(Some(report))
    }

    fn list(&self, kind: ReportKind) -> Result<Vec<DriftReport>> {
        let dir = self.kind_dir(kind);
        let mut reports = Vec::new();
        if !dir.exists() {
            return Ok(reports);
        }

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            // A single unreadable report must not break the whole join.
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping unreadable report {:?}: {}", path, e);
                    continue;
                }
            };
            match Self::parse(kind, &content) {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping malformed report {:?}: {}", path, e),
            }
        }

        reports.sort_by(|a, b| {
            (a.topic(), a.new_date()).cmp(&(b.topic(), b.new_date()))
        });
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::{ConceptStatus, SemanticStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn semantic_report(topic: &str, new_date: &str, score: f64) -> SemanticDriftReport {
        SemanticDriftReport {
            topic: topic.to_string(),
            timestamp: Utc::now(),
            old_date: date("2025-11-05"),
            new_date: date(new_date),
            old_samples: 50,
            new_samples: 50,
            cosine_drift: score,
            jsd_drift: score,
            drift_score: score,
            old_snapshot: String::new(),
            new_snapshot: String::new(),
            status: SemanticStatus::Stable,
        }
    }

    fn concept_report(topic: &str, new_date: &str) -> ConceptDriftReport {
        ConceptDriftReport {
            topic: topic.to_string(),
            timestamp: Utc::now(),
            old_date: date("2025-11-05"),
            new_date: date(new_date),
            old_samples: 50,
            new_samples: 50,
            train_acc: 0.9,
            test_acc: 0.55,
            train_f1: 0.9,
            test_f1: 0.54,
            accuracy_drop: 0.35,
            status: ConceptStatus::Stable,
        }
    }

    #[test]
    fn test_put_get_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let repo = FsReportRepository::new(tmp.path());

        let report = DriftReport::Semantic(semantic_report("Climate Change", "2025-11-06", 0.1));
        repo.put(&report).unwrap();

        let loaded = repo
            .get(ReportKind::Semantic, "Climate Change", date("2025-11-06"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, report);

        // Wrong kind resolves to a different file
        assert!(repo
            .get(ReportKind::Concept, "Climate Change", date("2025-11-06"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_put_overwrites_same_identity() {
        let tmp = TempDir::new().unwrap();
        let repo = FsReportRepository::new(tmp.path());

        repo.put(&semantic_report("Elections", "2025-11-06", 0.1).into())
            .unwrap();
        repo.put(&semantic_report("Elections", "2025-11-06", 0.2).into())
            .unwrap();

        let all = repo.list(ReportKind::Semantic).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].as_semantic().unwrap().drift_score, 0.2);
    }

    #[test]
    fn test_list_skips_malformed_files() {
        let tmp = TempDir::new().unwrap();
        let repo = FsReportRepository::new(tmp.path());
        repo.put(&concept_report("Elections", "2025-11-06").into())
            .unwrap();

        std::fs::write(
            tmp.path().join("concept").join("broken_concept_drift.json"),
            "{\"topic\": \"oops\"}",
        )
        .unwrap();

        let all = repo.list(ReportKind::Concept).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].topic(), "Elections");
    }

    #[test]
    fn test_latest_per_topic() {
        let tmp = TempDir::new().unwrap();
        let repo = FsReportRepository::new(tmp.path());

        repo.put(&semantic_report("Elections", "2025-11-06", 0.1).into())
            .unwrap();
        repo.put(&semantic_report("Elections", "2025-11-07", 0.3).into())
            .unwrap();
        repo.put(&semantic_report("Climate Change", "2025-11-06", 0.2).into())
            .unwrap();

        let latest = repo.latest_per_topic(ReportKind::Semantic).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["Elections"].new_date(), date("2025-11-07"));
        assert_eq!(latest["Climate Change"].new_date(), date("2025-11-06"));
    }
}
