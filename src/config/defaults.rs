//! Default values for configuration

/// Drift score above this is Significant Drift
pub fn default_semantic_significant_threshold() -> f64 {
    0.25
}

/// Drift score above this (and at or below significant) is Minor Drift
pub fn default_semantic_minor_threshold() -> f64 {
    0.15
}

/// Epsilon added to distribution sums before normalization
pub fn default_semantic_epsilon() -> f64 {
    1e-12
}

/// Maximum depth of each boosted tree
pub fn default_classifier_max_depth() -> usize {
    3
}

/// Number of boosting rounds
pub fn default_classifier_n_estimators() -> usize {
    50
}

/// Shrinkage applied to each tree's contribution
pub fn default_classifier_learning_rate() -> f64 {
    0.1
}

/// Seed for the stratified train/test shuffle
pub fn default_classifier_seed() -> u64 {
    42
}

/// Fraction of samples held out for testing
pub fn default_classifier_test_fraction() -> f64 {
    0.3
}

/// Test accuracy at or above this is Significant Drift
pub fn default_concept_significant_accuracy() -> f64 {
    0.75
}

/// Test accuracy at or above this (below significant) is Moderate Drift
pub fn default_concept_moderate_accuracy() -> f64 {
    0.60
}

/// Semantic score at or above this raises an alert (env: SEMANTIC_DRIFT_THRESHOLD)
pub fn default_alert_semantic_threshold() -> f64 {
    std::env::var("SEMANTIC_DRIFT_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.35)
}

/// Absolute accuracy drop at or above this raises an alert (env: CONCEPT_ACC_DROP_THRESHOLD)
pub fn default_alert_accuracy_drop_threshold() -> f64 {
    std::env::var("CONCEPT_ACC_DROP_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.08)
}

/// Default snapshot root, relative to the base directory
pub fn default_snapshots_dir() -> String {
    "embeddings".to_string()
}

/// Default drift report root, relative to the base directory
pub fn default_reports_dir() -> String {
    "drift_reports".to_string()
}

/// Default summary directory name, under the report root
pub fn default_summaries_dir() -> String {
    "summaries".to_string()
}
