//! Alerts command - evaluate thresholds against the latest summary

use crate::alert::{evaluate, AlertReport};
use crate::config::AlertConfig;
use crate::error::{Error, Result};
use crate::summary::SummaryStore;
use tracing::{info, warn};

/// Execute alerts - read the latest summary and apply thresholds.
///
/// Returns `None` when no summary exists yet; that is a logged non-event,
/// not a process failure.
pub fn cmd_alerts(config: &AlertConfig, store: &SummaryStore) -> Result<Option<AlertReport>> {
    let summary = match store.load_latest() {
        Ok(summary) => summary,
        Err(Error::NoSummary(dir)) => {
            warn!("No drift summary found in {}", dir);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let report = evaluate(config, &summary);
    if report.is_empty() {
        info!("No alerts triggered for {}", report.date);
    } else {
        // Delivery is a downstream concern; the formatted notification is
        // logged for the mailer job to pick up.
        info!("{}", report.subject());
    }
    Ok(Some(report))
}

/// Print an alert report to console
pub fn print_alert_report(report: &Option<AlertReport>) {
    match report {
        None => println!("No drift summary found."),
        Some(report) if report.is_empty() => {
            println!("No alerts triggered for {}.", report.date);
        }
        Some(report) => {
            println!("{}\n", report.subject());
            println!("{}", report.notification());
        }
    }
}
