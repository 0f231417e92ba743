//! Summarize command - aggregate drift reports into the dated summary

use crate::error::Result;
use crate::report::ReportRepository;
use crate::summary::{aggregate, DailySummary, SummaryStore};
use tracing::info;

/// Execute summarize - join the latest reports per topic and persist the
/// summary as JSON and CSV.
pub fn cmd_summarize(
    repo: &dyn ReportRepository,
    store: &SummaryStore,
) -> Result<DailySummary> {
    let summary = aggregate(repo)?;
    let (json_path, csv_path) = store.write(&summary)?;
    info!(
        "Summary for {} written to {:?} and {:?}",
        summary.date, json_path, csv_path
    );
    Ok(summary)
}

/// Print a summary table to console
pub fn print_summary(summary: &DailySummary) {
    println!("\nDrift Summary for {}\n", summary.date);

    if summary.rows.is_empty() {
        println!("No drift reports found.");
        return;
    }

    let number = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |x| format!("{x:.4}"));
    for row in &summary.rows {
        println!("{}", row.topic);
        println!(
            "  semantic: {} (score {}, cosine {}, jsd {})",
            row.semantic_status
                .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
            number(row.semantic_score),
            number(row.cosine_drift),
            number(row.jsd_drift),
        );
        println!(
            "  concept:  {} (test acc {}, test f1 {}, acc drop {})",
            row.concept_status
                .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
            number(row.test_acc),
            number(row.test_f1),
            number(row.accuracy_drop),
        );
    }
}
