//! Drift computation: shared status types and the two computers
//!
//! - [`semantic`]: distributional distance between two snapshots
//! - [`concept`]: old-vs-new discriminability via a trained classifier
//! - [`gbdt`]: the gradient-boosted tree classifier backing concept drift

pub mod concept;
pub mod gbdt;
pub mod semantic;

pub use concept::{ConceptDriftComputer, DatasetSplit};
pub use gbdt::{GradientBoostedTrees, Classifier};
pub use semantic::SemanticDriftComputer;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic drift status, decided from the combined drift score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticStatus {
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Minor Drift")]
    MinorDrift,
    #[serde(rename = "Significant Drift")]
    SignificantDrift,
}

impl fmt::Display for SemanticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "Stable"),
            Self::MinorDrift => write!(f, "Minor Drift"),
            Self::SignificantDrift => write!(f, "Significant Drift"),
        }
    }
}

/// Concept drift status, decided from test accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConceptStatus {
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Moderate Drift")]
    ModerateDrift,
    #[serde(rename = "Significant Drift")]
    SignificantDrift,
}

impl fmt::Display for ConceptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "Stable"),
            Self::ModerateDrift => write!(f, "Moderate Drift"),
            Self::SignificantDrift => write!(f, "Significant Drift"),
        }
    }
}

/// Round to four decimal places, matching the report contract
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
