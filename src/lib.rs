// src/lib.rs
//
// Padel shot analysis pipeline.
//
// Signal flow:
//   video file → features (pose | motion extractor) → FeatureSequence
//     → detector (sliding window → resample → classify → run-merge)
//     → ShotEvent list → analyzer / timeline / feedback
// The classifier artifact lives behind model::ModelStore (validity gate,
// lazy load, archive-and-replace, retrain fallback).

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod feedback;
pub mod model;
pub mod timeline;
pub mod video;

// Re-exports for ergonomic access from the binary and integration code.
pub use analyzer::{analyze_events, analyze_match, MatchSummary};
pub use config::{Config, ExtractorKind};
pub use detector::{ShotDetector, ShotEvent};
pub use error::PipelineError;
pub use features::{
    build_extractor, extract_features, resample, Extraction, FeatureExtractor, FeatureSequence,
};
pub use feedback::generate_feedback;
pub use model::{CommandRetrainer, LoadedModel, ModelStore, Prediction, Retrainer};
pub use timeline::{build_timeline, shot_color, TimelineEntry};
pub use video::{find_video_files, VideoSource};
