// src/model/mod.rs
//
// Classifier artifact lifecycle:
//   disk artifact → ModelStore (validity gate, lazy memoized load,
//   archive-and-replace, retrain fallback) → LoadedModel (inference)
// plus read-only views: archived versions, training metrics sidecar.

pub mod classifier;
pub mod metrics;
pub mod retrain;
pub mod store;
pub mod versions;

pub use classifier::{LoadedModel, Prediction};
pub use metrics::{load_metrics, ClassMetrics, TrainingMetrics};
pub use retrain::{CommandRetrainer, Retrainer};
pub use store::ModelStore;
pub use versions::{
    current_model_overview, format_bytes, list_model_versions, ModelOverview, ModelVersion,
};
