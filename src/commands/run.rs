//! Run command - the full detect -> summarize -> alerts pipeline

use super::{cmd_alerts, cmd_detect, cmd_summarize, DetectStats};
use crate::alert::AlertReport;
use crate::config::Config;
use crate::error::Result;
use crate::report::ReportRepository;
use crate::summary::{DailySummary, SummaryStore};
use serde::Serialize;
use std::path::Path;
use tracing::error;

/// Combined pipeline output
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub detect: Option<DetectStats>,
    pub summary: Option<DailySummary>,
    pub alerts: Option<AlertReport>,
}

/// Execute the whole pipeline. Each phase failure is logged and the later
/// phases still run; a partial outcome is better than none for downstream
/// consumers.
pub fn cmd_run(
    config: &Config,
    repo: &dyn ReportRepository,
    store: &SummaryStore,
    snapshots_root: &Path,
) -> Result<RunOutcome> {
    let detect = match cmd_detect(config, repo, snapshots_root) {
        Ok(stats) => Some(stats),
        Err(e) => {
            error!("Drift detection failed: {}", e);
            None
        }
    };

    let summary = match cmd_summarize(repo, store) {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!("Summary aggregation failed: {}", e);
            None
        }
    };

    let alerts = match cmd_alerts(&config.alerts, store) {
        Ok(report) => report,
        Err(e) => {
            error!("Alert evaluation failed: {}", e);
            None
        }
    };

    Ok(RunOutcome {
        detect,
        summary,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FsReportRepository;
    use crate::snapshot::{EmbeddingSnapshot, SnapshotStore};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_run_pipeline_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let snapshots = tmp.path().join("embeddings");
        let snapshot_store = SnapshotStore::new(&snapshots);
        let repo = FsReportRepository::new(tmp.path().join("drift_reports"));
        let store = SummaryStore::new(tmp.path().join("summaries"));

        for (day, offset) in [("2025-11-05", 0.0f32), ("2025-11-06", 3.0)] {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
            let vectors = (0..30)
                .map(|i| vec![offset + i as f32 * 0.01, offset])
                .collect();
            snapshot_store
                .save(&EmbeddingSnapshot::new("Climate Change", date, vectors))
                .unwrap();
        }

        let outcome = cmd_run(&Config::default(), &repo, &store, &snapshots).unwrap();

        let detect = outcome.detect.unwrap();
        assert_eq!(detect.semantic_reports, 1);
        assert_eq!(detect.concept_reports, 1);

        let summary = outcome.summary.unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.date.to_string(), "2025-11-06");

        // Alerts phase ran over the freshly written summary
        assert!(outcome.alerts.is_some());
    }

    #[test]
    fn test_run_with_missing_snapshot_dir_still_summarizes() {
        let tmp = TempDir::new().unwrap();
        let repo = FsReportRepository::new(tmp.path().join("drift_reports"));
        let store = SummaryStore::new(tmp.path().join("summaries"));

        let outcome = cmd_run(
            &Config::default(),
            &repo,
            &store,
            &tmp.path().join("missing"),
        )
        .unwrap();

        assert!(outcome.detect.is_none());
        // Aggregation tolerates an empty repository
        assert!(outcome.summary.is_some());
    }
}
