//! Semantic drift: distributional distance between two snapshots
//!
//! Two metrics over row-aligned snapshots of the same topic:
//! mean-vector cosine distance and Jensen-Shannon divergence over the
//! flattened absolute values. Their mean is the drift score that drives
//! the status decision.

use super::{round4, SemanticStatus};
use crate::config::SemanticConfig;
use crate::error::{Error, Result};
use crate::report::{DriftReport, ReportRepository, SemanticDriftReport};
use crate::snapshot::EmbeddingSnapshot;
use chrono::Utc;
use tracing::info;

pub struct SemanticDriftComputer {
    config: SemanticConfig,
}

impl SemanticDriftComputer {
    pub fn new(config: SemanticConfig) -> Self {
        Self { config }
    }

    /// Compute semantic drift metrics between two snapshots of one topic
    /// and persist the report.
    ///
    /// Both snapshots are truncated to the first `min(N_old, N_new)` rows
    /// before any metric is computed; zero usable rows is an
    /// [`Error::EmptyOverlap`].
    pub fn compute(
        &self,
        repo: &dyn ReportRepository,
        old: &EmbeddingSnapshot,
        new: &EmbeddingSnapshot,
    ) -> Result<SemanticDriftReport> {
        let topic = &old.topic;

        if let (Some(d_old), Some(d_new)) = (old.dimension(), new.dimension()) {
            if d_old != d_new {
                return Err(Error::MalformedSnapshot(format!(
                    "dimension mismatch for topic '{}': {} vs {}",
                    topic, d_old, d_new
                )));
            }
        }

        let n = old.len().min(new.len());
        if n == 0 {
            return Err(Error::EmptyOverlap(topic.clone()));
        }

        let old_rows = &old.vectors[..n];
        let new_rows = &new.vectors[..n];

        let cosine_drift = cosine_distance(&mean_vector(old_rows), &mean_vector(new_rows));
        let jsd_drift = jensen_shannon_divergence(
            &flatten_abs(old_rows),
            &flatten_abs(new_rows),
            self.config.epsilon,
        );
        let drift_score = round4((cosine_drift + jsd_drift) / 2.0);

        let report = SemanticDriftReport {
            topic: topic.clone(),
            timestamp: Utc::now(),
            old_date: old.date,
            new_date: new.date,
            old_samples: n,
            new_samples: n,
            cosine_drift,
            jsd_drift,
            drift_score,
            old_snapshot: old.source(),
            new_snapshot: new.source(),
            status: self.status_for(drift_score),
        };

        repo.put(&DriftReport::Semantic(report.clone()))?;
        info!(
            "Semantic drift for '{}': score {:.4} | {}",
            topic, drift_score, report.status
        );
        Ok(report)
    }

    /// First matching threshold wins; thresholds come from configuration,
    /// never from the data.
    fn status_for(&self, drift_score: f64) -> SemanticStatus {
        if drift_score > self.config.significant_threshold {
            SemanticStatus::SignificantDrift
        } else if drift_score > self.config.minor_threshold {
            SemanticStatus::MinorDrift
        } else {
            SemanticStatus::Stable
        }
    }
}

/// Element-wise mean over rows
fn mean_vector(rows: &[Vec<f32>]) -> Vec<f64> {
    let dim = rows.first().map_or(0, Vec::len);
    let mut mean = vec![0.0f64; dim];
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += f64::from(*v);
        }
    }
    let n = rows.len() as f64;
    for m in &mut mean {
        *m /= n;
    }
    mean
}

/// Flatten a matrix row-major into absolute values
fn flatten_abs(rows: &[Vec<f32>]) -> Vec<f64> {
    rows.iter()
        .flat_map(|row| row.iter().map(|v| f64::from(v.abs())))
        .collect()
}

/// Cosine distance `1 - cos(a, b)`, 0.0 by convention for a zero-norm input
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Jensen-Shannon divergence between two non-negative sequences
///
/// Each side is normalized to a probability distribution by dividing by
/// its sum plus `epsilon`; entropies use natural log, so the result is
/// bounded by ln 2.
pub fn jensen_shannon_divergence(p: &[f64], q: &[f64], epsilon: f64) -> f64 {
    let p = normalize(p, epsilon);
    let q = normalize(q, epsilon);
    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| 0.5 * (a + b)).collect();
    0.5 * (kl_divergence(&p, &m) + kl_divergence(&q, &m))
}

fn normalize(values: &[f64], epsilon: f64) -> Vec<f64> {
    let sum: f64 = values.iter().sum::<f64>() + epsilon;
    values.iter().map(|v| v / sum).collect()
}

fn kl_divergence(p: &[f64], m: &[f64]) -> f64 {
    p.iter()
        .zip(m)
        .filter(|(pi, mi)| **pi > 0.0 && **mi > 0.0)
        .map(|(pi, mi)| pi * (pi / mi).ln())
        .sum()
}
