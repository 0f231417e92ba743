//! Detect command - run both drift computers over the snapshot store

use crate::config::Config;
use crate::drift::{ConceptDriftComputer, SemanticDriftComputer};
use crate::error::Result;
use crate::report::ReportRepository;
use crate::snapshot::{consecutive_pairs, SnapshotStore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Detection statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectStats {
    pub date_pairs: usize,
    pub topics_processed: usize,
    pub semantic_reports: usize,
    pub concept_reports: usize,
    pub errors: Vec<String>,
}

/// Execute detect - walk every consecutive snapshot date pair and compute
/// semantic and concept drift for each common topic.
///
/// Failures are isolated per (topic, date pair): they are logged, recorded
/// in the stats, and never abort the batch.
pub fn cmd_detect(
    config: &Config,
    repo: &dyn ReportRepository,
    snapshots_root: &Path,
) -> Result<DetectStats> {
    info!("Running drift detection over {:?}", snapshots_root);

    let store = SnapshotStore::new(snapshots_root);
    let dates = store.list_dates()?;
    let pairs = consecutive_pairs(&dates);

    let semantic = SemanticDriftComputer::new(config.semantic.clone());
    let concept = ConceptDriftComputer::new(config.classifier.clone(), config.concept.clone());

    let mut stats = DetectStats {
        date_pairs: pairs.len(),
        ..DetectStats::default()
    };

    for (old_date, new_date) in pairs {
        info!("Comparing embeddings: {} -> {}", old_date, new_date);

        let topics = store.common_topics(old_date, new_date)?;
        if topics.is_empty() {
            warn!("No common topics found between {} and {}", old_date, new_date);
            continue;
        }

        for topic in topics {
            stats.topics_processed += 1;
            process_topic(
                &store, repo, &semantic, &concept, &topic, old_date, new_date, &mut stats,
            );
        }
    }

    info!(
        "Drift detection completed: {} semantic, {} concept report(s), {} error(s)",
        stats.semantic_reports,
        stats.concept_reports,
        stats.errors.len()
    );
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn process_topic(
    store: &SnapshotStore,
    repo: &dyn ReportRepository,
    semantic: &SemanticDriftComputer,
    concept: &ConceptDriftComputer,
    topic: &str,
    old_date: NaiveDate,
    new_date: NaiveDate,
    stats: &mut DetectStats,
) {
    let record = |stats: &mut DetectStats, context: &str, message: String| {
        let error_msg = format!("{topic} {old_date}->{new_date} {context}: {message}");
        warn!(%error_msg, "Drift computation failed");
        stats.errors.push(error_msg);
    };

    let (old, new) = match (store.load(topic, old_date), store.load(topic, new_date)) {
        (Ok(old), Ok(new)) => (old, new),
        (Err(e), _) | (_, Err(e)) => {
            record(stats, "snapshot", e.to_string());
            return;
        }
    };

    match semantic.compute(repo, &old, &new) {
        Ok(_) => stats.semantic_reports += 1,
        Err(e) => record(stats, "semantic", e.to_string()),
    }

    match concept.compute(repo, &old, &new) {
        Ok(_) => stats.concept_reports += 1,
        Err(e) => record(stats, "concept", e.to_string()),
    }
}

/// Print detect stats to console
pub fn print_detect_stats(stats: &DetectStats) {
    println!("\nDrift Detection Complete\n");
    println!("Date pairs compared: {}", stats.date_pairs);
    println!("Topics processed: {}", stats.topics_processed);
    println!("Semantic reports written: {}", stats.semantic_reports);
    println!("Concept reports written: {}", stats.concept_reports);

    if !stats.errors.is_empty() {
        println!("\nErrors:");
        for error in &stats.errors {
            println!("- {}", error);
        }
    }
}
