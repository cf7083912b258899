// src/model/classifier.rs
//
// Loaded shot classifier. Artifact contract: an ONNX graph with a single
// input tensor [1, target_frames * D] and a single output tensor [1, C] of
// class scores, where C must equal the configured label count. The label
// set travels in config next to the artifact; a width mismatch is a
// feature/model version skew and is reported with both numbers.

use crate::error::PipelineError;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: String,
    /// Max posterior probability. Absent when the model emits raw scores
    /// rather than a probability distribution; never fabricated.
    pub confidence: Option<f32>,
}

pub struct LoadedModel {
    session: Mutex<Session>,
    input_name: String,
    classes: Vec<String>,
}

impl LoadedModel {
    /// Build a session from the artifact file. The store is responsible for
    /// existence and size checks before calling this.
    pub(crate) fn from_file(path: &Path, classes: Vec<String>) -> Result<Self, PipelineError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(path)
            .map_err(|e| PipelineError::ModelCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let input_name = session.inputs()[0].name().to_string();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            classes,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Classify one resampled window vector.
    pub fn predict(&self, input: &[f32]) -> Result<Prediction, PipelineError> {
        let shape = [1usize, input.len()];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PipelineError::Inference("classifier session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| {
                PipelineError::Inference(format!(
                    "classifier run failed on a {}-value input: {}",
                    input.len(),
                    e
                ))
            })?;
        let (_, scores) = outputs[0].try_extract_tensor::<f32>()?;

        if scores.len() != self.classes.len() {
            return Err(PipelineError::ClassifierShape {
                expected: self.classes.len(),
                actual: scores.len(),
            });
        }

        let (best_idx, best_score) = scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| PipelineError::Inference("classifier produced no scores".to_string()))?;

        let confidence = if is_distribution(scores) {
            Some(best_score)
        } else {
            None
        };

        debug!(
            "Predicted {} (confidence {:?})",
            self.classes[best_idx], confidence
        );
        Ok(Prediction {
            label: self.classes[best_idx].clone(),
            confidence,
        })
    }
}

/// A score vector counts as a probability distribution when every value is
/// in [0, 1] and the total is within 5% of 1.
fn is_distribution(scores: &[f32]) -> bool {
    let sum: f32 = scores.iter().sum();
    scores.iter().all(|&v| (0.0..=1.0).contains(&v)) && (sum - 1.0).abs() < 0.05
}
