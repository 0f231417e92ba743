//! History command - per-topic trend slice across stored summaries

use crate::error::Result;
use crate::snapshot::topic_from_stem;
use crate::summary::{SummaryStore, TrendPoint};

/// Execute history - collect one topic's drift trend, oldest first.
///
/// Accepts the underscore-encoded topic form used in filenames and URLs
/// ("Climate_Change") as well as the display name.
pub fn cmd_history(
    store: &SummaryStore,
    topic: &str,
    last: Option<usize>,
) -> Result<Vec<TrendPoint>> {
    let topic = topic_from_stem(topic);
    store.topic_history(&topic, last)
}

/// Print a topic's trend to console
pub fn print_history(topic: &str, points: &[TrendPoint]) {
    if points.is_empty() {
        println!("No history found for '{}'.", topic);
        return;
    }

    println!("\nDrift history for '{}'\n", topic);
    let number = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |x| format!("{x:.4}"));
    for point in points {
        println!(
            "{}  semantic={}  cosine={}  jsd={}  acc_drop={}  concept={}",
            point.date,
            number(point.semantic_score),
            number(point.cosine_drift),
            number(point.jsd_drift),
            number(point.accuracy_drop),
            point
                .concept_status
                .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{DailySummary, SummaryRow};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_history_accepts_underscored_topic() {
        let tmp = TempDir::new().unwrap();
        let store = SummaryStore::new(tmp.path());
        let date = NaiveDate::parse_from_str("2025-11-06", "%Y-%m-%d").unwrap();

        store
            .write(&DailySummary {
                generated_at: Utc::now(),
                date,
                rows: vec![SummaryRow {
                    topic: "Climate Change".to_string(),
                    date,
                    semantic_status: None,
                    semantic_score: Some(0.2),
                    cosine_drift: Some(0.2),
                    jsd_drift: Some(0.2),
                    concept_status: None,
                    test_acc: None,
                    test_f1: None,
                    accuracy_drop: None,
                }],
            })
            .unwrap();

        let points = cmd_history(&store, "Climate_Change", None).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].semantic_score, Some(0.2));
    }
}
