//! driftwatch - semantic and concept drift monitoring over per-topic
//! embedding snapshots
//!
//! Given dated embedding snapshots of topic corpora, driftwatch decides
//! per topic whether the underlying semantic distribution has shifted
//! (semantic drift) and whether a trained classifier can tell the two
//! periods apart (concept drift), then rolls both signals into a dated
//! summary that alerting and read tooling consume.

pub mod alert;
pub mod commands;
pub mod config;
pub mod drift;
pub mod error;
pub mod report;
pub mod snapshot;
pub mod summary;

pub use error::{Error, Result};
