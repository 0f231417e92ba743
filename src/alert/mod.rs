//! Alert evaluation over the latest daily summary
//!
//! A row alerts when its semantic score or the magnitude of its accuracy
//! drop crosses the configured threshold. Delivery (email, chat) is a
//! downstream concern; this module only decides and formats.

use crate::config::AlertConfig;
use crate::summary::{DailySummary, SummaryRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The alerting rows of one summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertReport {
    pub date: NaiveDate,
    pub semantic_threshold: f64,
    pub accuracy_drop_threshold: f64,
    pub alerts: Vec<SummaryRow>,
}

impl AlertReport {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Notification body: dated header plus one line per alerting topic
    pub fn notification(&self) -> String {
        let mut lines = vec![
            format!("DriftWatch alert - {}", self.date),
            String::new(),
            "Topics exceeding thresholds:".to_string(),
        ];
        for row in &self.alerts {
            lines.push(format!(
                "- {}: semantic={}  accuracy_drop={}",
                row.topic,
                row.semantic_score
                    .map_or_else(|| "N/A".to_string(), |v| format!("{v:.4}")),
                row.accuracy_drop
                    .map_or_else(|| "N/A".to_string(), |v| format!("{v:.4}")),
            ));
        }
        lines.join("\n")
    }

    /// Notification subject line
    pub fn subject(&self) -> String {
        format!(
            "[DriftWatch] Drift alert for {} ({} topic(s))",
            self.date,
            self.alerts.len()
        )
    }
}

/// Evaluate thresholds against one summary
pub fn evaluate(config: &AlertConfig, summary: &DailySummary) -> AlertReport {
    let alerts: Vec<SummaryRow> = summary
        .rows
        .iter()
        .filter(|row| row_alerts(config, row))
        .cloned()
        .collect();

    info!(
        "Alert check for {}: {} of {} topic(s) over thresholds",
        summary.date,
        alerts.len(),
        summary.rows.len()
    );

    AlertReport {
        date: summary.date,
        semantic_threshold: config.semantic_threshold,
        accuracy_drop_threshold: config.accuracy_drop_threshold,
        alerts,
    }
}

fn row_alerts(config: &AlertConfig, row: &SummaryRow) -> bool {
    let semantic = row
        .semantic_score
        .is_some_and(|score| score >= config.semantic_threshold);
    let concept = row
        .accuracy_drop
        .is_some_and(|drop| drop.abs() >= config.accuracy_drop_threshold);
    semantic || concept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(topic: &str, semantic_score: Option<f64>, accuracy_drop: Option<f64>) -> SummaryRow {
        SummaryRow {
            topic: topic.to_string(),
            date: NaiveDate::parse_from_str("2025-11-06", "%Y-%m-%d").unwrap(),
            semantic_status: None,
            semantic_score,
            cosine_drift: None,
            jsd_drift: None,
            concept_status: None,
            test_acc: None,
            test_f1: None,
            accuracy_drop,
        }
    }

    fn summary(rows: Vec<SummaryRow>) -> DailySummary {
        DailySummary {
            generated_at: Utc::now(),
            date: NaiveDate::parse_from_str("2025-11-06", "%Y-%m-%d").unwrap(),
            rows,
        }
    }

    fn config() -> AlertConfig {
        AlertConfig {
            semantic_threshold: 0.35,
            accuracy_drop_threshold: 0.08,
        }
    }

    #[test]
    fn test_semantic_threshold_alert() {
        let report = evaluate(
            &config(),
            &summary(vec![
                row("Calm", Some(0.1), Some(0.01)),
                row("Loud", Some(0.4), Some(0.01)),
            ]),
        );
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].topic, "Loud");
    }

    #[test]
    fn test_accuracy_drop_uses_magnitude() {
        // A negative drop (test beat train) still counts by magnitude
        let report = evaluate(
            &config(),
            &summary(vec![row("Swing", Some(0.0), Some(-0.12))]),
        );
        assert_eq!(report.alerts.len(), 1);
    }

    #[test]
    fn test_missing_dimensions_do_not_alert() {
        let report = evaluate(&config(), &summary(vec![row("Sparse", None, None)]));
        assert!(report.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let report = evaluate(
            &config(),
            &summary(vec![
                row("Edge", Some(0.35), None),
                row("Below", Some(0.3499), None),
            ]),
        );
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].topic, "Edge");
    }

    #[test]
    fn test_notification_format() {
        let report = evaluate(
            &config(),
            &summary(vec![row("Elections", Some(0.5), Some(0.2))]),
        );
        let body = report.notification();
        assert!(body.starts_with("DriftWatch alert - 2025-11-06"));
        assert!(body.contains("- Elections: semantic=0.5000  accuracy_drop=0.2000"));
        assert_eq!(
            report.subject(),
            "[DriftWatch] Drift alert for 2025-11-06 (1 topic(s))"
        );
    }
}
