//! Gradient-boosted decision trees for binary classification
//!
//! Logistic-loss boosting over depth-limited regression trees. Each round
//! fits a tree to the current pseudo-residuals with exact greedy
//! squared-error splits and takes a Newton step per leaf. Training is
//! fully deterministic for a given input, which makes the concept-drift
//! reports reproducible.

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};

/// Binary classifier seam used by the concept drift computer
///
/// Rows of `features` are samples; `labels` are 0/1.
pub trait Classifier {
    fn fit(&mut self, features: &[Vec<f32>], labels: &[u8]) -> Result<()>;
    fn predict(&self, features: &[Vec<f32>]) -> Vec<u8>;
}

/// Factory injected into the concept drift computer
pub type ClassifierFactory = Box<dyn Fn(&ClassifierConfig) -> Box<dyn Classifier>>;

/// Default factory producing the in-crate booster
pub fn gbdt_factory() -> ClassifierFactory {
    Box::new(|config| Box::new(GradientBoostedTrees::new(config.clone())))
}

const MAX_LOG_ODDS: f64 = 10.0;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn score(&self, row: &[f32]) -> f64 {
        match self {
            Self::Leaf { value } => *value,
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if f64::from(row[*feature]) <= *threshold {
                    left.score(row)
                } else {
                    right.score(row)
                }
            }
        }
    }
}

/// The boosted ensemble
pub struct GradientBoostedTrees {
    config: ClassifierConfig,
    base_score: f64,
    trees: Vec<Node>,
}

impl GradientBoostedTrees {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            base_score: 0.0,
            trees: Vec::new(),
        }
    }

    /// Predicted probability of class 1 for one row
    pub fn predict_proba(&self, row: &[f32]) -> f64 {
        let mut score = self.base_score;
        for tree in &self.trees {
            score += self.config.learning_rate * tree.score(row);
        }
        sigmoid(score)
    }
}

impl Classifier for GradientBoostedTrees {
    fn fit(&mut self, features: &[Vec<f32>], labels: &[u8]) -> Result<()> {
        if features.is_empty() {
            return Err(Error::ModelTraining("empty training set".to_string()));
        }
        if features.len() != labels.len() {
            return Err(Error::ModelTraining(format!(
                "feature/label length mismatch: {} vs {}",
                features.len(),
                labels.len()
            )));
        }

        let n = features.len();
        let positives = labels.iter().filter(|&&y| y == 1).count() as f64;
        let prior = (positives / n as f64).clamp(1e-6, 1.0 - 1e-6);
        self.base_score = (prior / (1.0 - prior)).ln();
        self.trees.clear();

        let mut scores = vec![self.base_score; n];
        let all_rows: Vec<usize> = (0..n).collect();

        for _ in 0..self.config.n_estimators {
            // Pseudo-residuals and Hessian weights of the logistic loss
            let mut gradients = vec![0.0f64; n];
            let mut hessians = vec![0.0f64; n];
            for i in 0..n {
                let p = sigmoid(scores[i]);
                gradients[i] = f64::from(labels[i]) - p;
                hessians[i] = (p * (1.0 - p)).max(1e-12);
            }

            let tree = build_tree(
                features,
                &gradients,
                &hessians,
                &all_rows,
                self.config.max_depth,
            );

            for i in 0..n {
                scores[i] += self.config.learning_rate * tree.score(&features[i]);
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, features: &[Vec<f32>]) -> Vec<u8> {
        features
            .iter()
            .map(|row| u8::from(self.predict_proba(row) >= 0.5))
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn leaf_value(rows: &[usize], gradients: &[f64], hessians: &[f64]) -> f64 {
    let grad_sum: f64 = rows.iter().map(|&i| gradients[i]).sum();
    let hess_sum: f64 = rows.iter().map(|&i| hessians[i]).sum();
    (grad_sum / hess_sum).clamp(-MAX_LOG_ODDS, MAX_LOG_ODDS)
}

fn build_tree(
    features: &[Vec<f32>],
    gradients: &[f64],
    hessians: &[f64],
    rows: &[usize],
    depth: usize,
) -> Node {
    if depth == 0 || rows.len() < 2 {
        return Node::Leaf {
            value: leaf_value(rows, gradients, hessians),
        };
    }

    match best_split(features, gradients, hessians, rows) {
        Some((feature, threshold)) => {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .copied()
                .partition(|&i| f64::from(features[i][feature]) <= threshold);

            let left = build_tree(features, gradients, hessians, &left_rows, depth - 1);
            let right = build_tree(features, gradients, hessians, &right_rows, depth - 1);
            Node::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        None => Node::Leaf {
            value: leaf_value(rows, gradients, hessians),
        },
    }
}

/// Exact greedy split search: for every feature, sort the rows and score
/// every boundary between distinct values by the Newton gain.
fn best_split(
    features: &[Vec<f32>],
    gradients: &[f64],
    hessians: &[f64],
    rows: &[usize],
) -> Option<(usize, f64)> {
    let dim = features[rows[0]].len();
    let total_grad: f64 = rows.iter().map(|&i| gradients[i]).sum();
    let total_hess: f64 = rows.iter().map(|&i| hessians[i]).sum();
    let parent_gain = total_grad * total_grad / total_hess;

    let mut best: Option<(usize, f64)> = None;
    let mut best_gain = 1e-12;

    let mut sorted = rows.to_vec();
    for feature in 0..dim {
        sorted.sort_by(|&a, &b| {
            features[a][feature]
                .partial_cmp(&features[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_grad = 0.0;
        let mut left_hess = 0.0;
        for k in 0..sorted.len() - 1 {
            let i = sorted[k];
            left_grad += gradients[i];
            left_hess += hessians[i];

            let here = f64::from(features[i][feature]);
            let next = f64::from(features[sorted[k + 1]][feature]);
            if here == next {
                continue;
            }

            let right_grad = total_grad - left_grad;
            let right_hess = total_hess - left_hess;
            let gain = left_grad * left_grad / left_hess
                + right_grad * right_grad / right_hess
                - parent_gain;

            if gain > best_gain {
                best_gain = gain;
                best = Some((feature, 0.5 * (here + next)));
            }
        }
    }

    best
}
