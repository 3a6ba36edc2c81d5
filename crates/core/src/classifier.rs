//! Content quality classification.
//!
//! A [`QualityClassifier`] is either backed by a pretrained random forest
//! (plus the label encoder that names its classes) or falls back to a fixed
//! word-count/readability heuristic when no model is available.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::{Result, SeoscopeError};

/// Number of inputs the model consumes: word count, sentence count, readability.
pub const MODEL_FEATURES: usize = 3;

/// Quality tier assigned to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    High,
    Medium,
    Low,
}

impl QualityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::High => "High",
            QualityLabel::Medium => "Medium",
            QualityLabel::Low => "Low",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLabel {
    type Err = SeoscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "High" => Ok(QualityLabel::High),
            "Medium" => Ok(QualityLabel::Medium),
            "Low" => Ok(QualityLabel::Low),
            other => Err(SeoscopeError::ModelError(format!("unknown quality label '{other}'"))),
        }
    }
}

/// Rule-based verdict used when no trained model is available.
///
/// `High` needs more than 1500 words and a Flesch score in `[50, 70]`;
/// fewer than 500 words or a score under 30 is `Low`; anything else is
/// `Medium`.
pub fn heuristic_label(word_count: usize, flesch_reading_ease: f64) -> QualityLabel {
    if word_count > 1500 && (50.0..=70.0).contains(&flesch_reading_ease) {
        QualityLabel::High
    } else if word_count < 500 || flesch_reading_ease < 30.0 {
        QualityLabel::Low
    } else {
        QualityLabel::Medium
    }
}

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    Model,
    Heuristic,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Model => "model",
            VerdictSource::Heuristic => "heuristic",
        }
    }
}

/// A quality label with the class probabilities behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityVerdict {
    pub label: QualityLabel,
    /// Probability per known class; empty for heuristic verdicts.
    pub probabilities: BTreeMap<QualityLabel, f64>,
    pub source: VerdictSource,
}

impl QualityVerdict {
    /// Probabilities ordered from most to least likely.
    pub fn ranked_probabilities(&self) -> Vec<(QualityLabel, f64)> {
        let mut ranked: Vec<_> = self.probabilities.iter().map(|(l, p)| (*l, *p)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// A node of a decision tree.
///
/// Split nodes send a sample left when `x[feature] <= threshold`. Leaves hold
/// per-class weights (sample counts or fractions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Normalized class distribution at the leaf `input` lands in.
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let x = input
                        .get(*feature)
                        .ok_or_else(|| SeoscopeError::ModelError(format!("feature index {feature} out of range")))?;
                    index = if *x <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    let norm = if total > 0.0 { total } else { 1.0 };
                    return Ok(value.iter().map(|v| v / norm).collect());
                }
                None => return Err(SeoscopeError::ModelError(format!("dangling node index {index}"))),
            }
        }
    }

    fn validate(&self, n_features: usize, classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(SeoscopeError::ModelError("tree has no nodes".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(SeoscopeError::ModelError(format!(
                            "node {i} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    // Children always come after their parent, which rules out cycles.
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(SeoscopeError::ModelError(format!("node {i} has invalid child {child}")));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != classes {
                        return Err(SeoscopeError::ModelError(format!(
                            "leaf {i} has {} class weights, expected {classes}",
                            value.len()
                        )));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(SeoscopeError::ModelError(format!(
                            "leaf {i} has a negative or non-finite class weight"
                        )));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(SeoscopeError::ModelError(format!("leaf {i} has no class weight")));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A random forest: tree distributions are averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = read_json(path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_features != MODEL_FEATURES {
            return Err(SeoscopeError::ModelError(format!(
                "model expects {} features, pipeline provides {MODEL_FEATURES}",
                self.n_features
            )));
        }
        if self.classes == 0 || self.trees.is_empty() {
            return Err(SeoscopeError::ModelError("model has no classes or no trees".to_string()));
        }
        self.trees.iter().try_for_each(|tree| tree.validate(self.n_features, self.classes))
    }

    /// Mean class distribution across all trees.
    pub fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.n_features {
            return Err(SeoscopeError::ModelError(format!(
                "got {} features, model expects {}",
                input.len(),
                self.n_features
            )));
        }

        let mut sums = vec![0.0; self.classes];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.predict_proba(input)?) {
                *sum += p;
            }
        }

        let count = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / count).collect())
    }
}

/// Maps model class indices to label names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Loads an encoder and checks every class is a known quality label.
    pub fn load(path: &Path) -> Result<Self> {
        let encoder: Self = read_json(path)?;
        encoder.labels()?;
        Ok(encoder)
    }

    /// Parses the class names, rejecting unknown and repeated labels.
    pub fn labels(&self) -> Result<Vec<QualityLabel>> {
        let labels: Vec<QualityLabel> = self.classes.iter().map(|c| c.parse()).collect::<Result<_>>()?;

        let mut seen = BTreeSet::new();
        if let Some(dup) = labels.iter().find(|label| !seen.insert(**label)) {
            return Err(SeoscopeError::ModelError(format!("encoder lists class {dup} more than once")));
        }
        Ok(labels)
    }
}

/// Quality classifier service, built once and shared read-only.
#[derive(Debug, Clone)]
pub enum QualityClassifier {
    Trained { model: ForestModel, labels: Vec<QualityLabel> },
    Heuristic,
}

impl QualityClassifier {
    /// Pairs a model with its encoder, checking that they agree on the class count.
    pub fn trained(model: ForestModel, encoder: LabelEncoder) -> Result<Self> {
        model.validate()?;
        let labels = encoder.labels()?;
        if labels.len() != model.classes {
            return Err(SeoscopeError::ModelError(format!(
                "encoder has {} classes, model has {}",
                labels.len(),
                model.classes
            )));
        }
        Ok(QualityClassifier::Trained { model, labels })
    }

    /// Loads model and encoder artifacts, strictly.
    pub fn try_load(model_path: &Path, encoder_path: &Path) -> Result<Self> {
        Self::trained(ForestModel::load(model_path)?, LabelEncoder::load(encoder_path)?)
    }

    /// Loads model and encoder artifacts, falling back to the heuristic when
    /// either is missing or unusable.
    pub fn load(model_path: &Path, encoder_path: &Path) -> Self {
        match Self::try_load(model_path, encoder_path) {
            Ok(classifier) => {
                tracing::debug!(model = %model_path.display(), "loaded quality model");
                classifier
            }
            Err(e) => {
                tracing::warn!(error = %e, "quality model unavailable, using heuristic");
                QualityClassifier::Heuristic
            }
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, QualityClassifier::Trained { .. })
    }

    /// Classifies a page from its features.
    ///
    /// The heuristic never fails. A trained model fails with
    /// [`SeoscopeError::ModelError`] if prediction goes wrong.
    pub fn classify(&self, features: &FeatureVector) -> Result<QualityVerdict> {
        match self {
            QualityClassifier::Heuristic => Ok(QualityVerdict {
                label: heuristic_label(features.word_count, features.flesch_reading_ease),
                probabilities: BTreeMap::new(),
                source: VerdictSource::Heuristic,
            }),
            QualityClassifier::Trained { model, labels } => {
                let proba = model.predict_proba(&features.as_model_input())?;

                let mut best = 0;
                for (i, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = i;
                    }
                }

                let label = *labels
                    .get(best)
                    .ok_or_else(|| SeoscopeError::ModelError(format!("class index {best} has no label")))?;

                Ok(QualityVerdict {
                    label,
                    probabilities: labels.iter().copied().zip(proba).collect(),
                    source: VerdictSource::Model,
                })
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(SeoscopeError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SeoscopeError::ModelError(format!("{}: {e}", path.display())))
}
