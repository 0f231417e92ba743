//! Configuration management for driftwatch
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot root directory, relative to the base directory unless absolute
    #[serde(default = "default_snapshots_dir")]
    pub snapshots_dir: String,

    /// Drift report root directory, relative to the base directory unless absolute
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Summary directory name under the report root
    #[serde(default = "default_summaries_dir")]
    pub summaries_dir: String,

    /// Semantic drift thresholds
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Classifier hyperparameters (part of the reproducible contract)
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Concept drift status thresholds
    #[serde(default)]
    pub concept: ConceptConfig,

    /// Alerting thresholds
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Semantic drift configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Drift score above this is Significant Drift
    #[serde(default = "default_semantic_significant_threshold")]
    pub significant_threshold: f64,

    /// Drift score above this is Minor Drift
    #[serde(default = "default_semantic_minor_threshold")]
    pub minor_threshold: f64,

    /// Epsilon guard for probability normalization
    #[serde(default = "default_semantic_epsilon")]
    pub epsilon: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            significant_threshold: default_semantic_significant_threshold(),
            minor_threshold: default_semantic_minor_threshold(),
            epsilon: default_semantic_epsilon(),
        }
    }
}

/// Gradient-boosted classifier hyperparameters
///
/// These are fixed per deployment, never tuned per run: identical inputs and
/// seed must yield identical reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum depth of each boosted tree
    #[serde(default = "default_classifier_max_depth")]
    pub max_depth: usize,

    /// Number of boosting rounds
    #[serde(default = "default_classifier_n_estimators")]
    pub n_estimators: usize,

    /// Shrinkage applied to each tree's contribution
    #[serde(default = "default_classifier_learning_rate")]
    pub learning_rate: f64,

    /// Seed for the stratified train/test shuffle
    #[serde(default = "default_classifier_seed")]
    pub seed: u64,

    /// Fraction of samples held out for testing
    #[serde(default = "default_classifier_test_fraction")]
    pub test_fraction: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_depth: default_classifier_max_depth(),
            n_estimators: default_classifier_n_estimators(),
            learning_rate: default_classifier_learning_rate(),
            seed: default_classifier_seed(),
            test_fraction: default_classifier_test_fraction(),
        }
    }
}

/// Concept drift status thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptConfig {
    /// Test accuracy at or above this is Significant Drift
    #[serde(default = "default_concept_significant_accuracy")]
    pub significant_accuracy: f64,

    /// Test accuracy at or above this is Moderate Drift
    #[serde(default = "default_concept_moderate_accuracy")]
    pub moderate_accuracy: f64,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            significant_accuracy: default_concept_significant_accuracy(),
            moderate_accuracy: default_concept_moderate_accuracy(),
        }
    }
}

/// Alerting thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Semantic score at or above this raises an alert
    #[serde(default = "default_alert_semantic_threshold")]
    pub semantic_threshold: f64,

    /// Absolute accuracy drop at or above this raises an alert
    #[serde(default = "default_alert_accuracy_drop_threshold")]
    pub accuracy_drop_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: default_alert_semantic_threshold(),
            accuracy_drop_threshold: default_alert_accuracy_drop_threshold(),
        }
    }
}

/// Resolved filesystem paths (derived from the base directory)
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    pub base_dir: PathBuf,
    pub config_file: PathBuf,
    pub snapshots_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub summaries_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshots_dir: default_snapshots_dir(),
            reports_dir: default_reports_dir(),
            summaries_dir: default_summaries_dir(),
            semantic: SemanticConfig::default(),
            classifier: ClassifierConfig::default(),
            concept: ConceptConfig::default(),
            alerts: AlertConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Get the default base directory (~/.local/share/driftwatch or fallback)
    pub fn default_base_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("driftwatch")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        let resolve = |dir: &str| {
            let p = Path::new(dir);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        let reports = resolve(&self.reports_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            snapshots_dir: resolve(&self.snapshots_dir),
            summaries_dir: reports.join(&self.summaries_dir),
            reports_dir: reports,
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.init_paths(Some(base));

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            let base = config.paths.base_dir.clone();
            loaded.init_paths(Some(base));
            loaded.validate()?;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.semantic.minor_threshold >= self.semantic.significant_threshold {
            return Err(Error::Config(
                "semantic.minor_threshold must be < semantic.significant_threshold".to_string(),
            ));
        }

        if self.semantic.epsilon <= 0.0 {
            return Err(Error::Config(
                "semantic.epsilon must be positive".to_string(),
            ));
        }

        if self.classifier.max_depth == 0 || self.classifier.n_estimators == 0 {
            return Err(Error::Config(
                "classifier.max_depth and classifier.n_estimators must be >= 1".to_string(),
            ));
        }

        if self.classifier.learning_rate <= 0.0 || self.classifier.learning_rate > 1.0 {
            return Err(Error::Config(
                "classifier.learning_rate must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.classifier.test_fraction <= 0.0 || self.classifier.test_fraction >= 1.0 {
            return Err(Error::Config(
                "classifier.test_fraction must be in (0.0, 1.0)".to_string(),
            ));
        }

        if self.concept.moderate_accuracy >= self.concept.significant_accuracy {
            return Err(Error::Config(
                "concept.moderate_accuracy must be < concept.significant_accuracy".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.semantic.significant_threshold, 0.25);
        assert_eq!(config.classifier.n_estimators, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.classifier.seed = 7;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.classifier.seed, 7);
        assert_eq!(
            loaded.paths.summaries_dir,
            tmp.path().join("drift_reports").join("summaries")
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Invalid: minor >= significant
        config.semantic.minor_threshold = config.semantic.significant_threshold;
        assert!(config.validate().is_err());

        // Fix it
        config.semantic.minor_threshold = 0.15;
        assert!(config.validate().is_ok());

        // Invalid: degenerate split
        config.classifier.test_fraction = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_absolute_dirs_kept() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.snapshots_dir = "/var/lib/driftwatch/embeddings".to_string();
        config.init_paths(Some(tmp.path().to_path_buf()));

        assert_eq!(
            config.paths.snapshots_dir,
            PathBuf::from("/var/lib/driftwatch/embeddings")
        );
        assert_eq!(
            config.paths.reports_dir,
            tmp.path().join("drift_reports")
        );
    }
}
