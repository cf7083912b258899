// src/model/metrics.rs
//
// Metrics sidecar written by the (external) training process. The core
// never writes this file; it only reads it for reporting, so anything
// unreadable degrades to "no metrics" with a warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub macro_f1: Option<f64>,
    #[serde(default)]
    pub per_class: BTreeMap<String, ClassMetrics>,
    #[serde(default)]
    pub feature_frames: Option<usize>,
    #[serde(default)]
    pub feature_dim: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub f1: Option<f64>,
    #[serde(default)]
    pub support: Option<u64>,
}

/// `None` when the sidecar does not exist or cannot be parsed.
pub fn load_metrics(path: &str) -> Option<TrainingMetrics> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!("Unreadable metrics sidecar {}: {}", path, e);
            None
        }
    }
}
