//! Status command - show the latest stored summary

use crate::error::Result;
use crate::summary::{DailySummary, SummaryStore};

/// Execute status - load the most recent summary.
pub fn cmd_status(store: &SummaryStore) -> Result<DailySummary> {
    store.load_latest()
}
