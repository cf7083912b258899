// src/features/mod.rs
//
// Per-frame feature extraction.
//
// Signal flow:
//   video file → VideoSource frames → PoseExtractor | MotionExtractor
//     → FeatureSequence (frames × D table + per-frame timestamps)
//
// Which extractor runs is a startup decision from config, never a runtime
// fallback: both variants are legitimate, but the choice must be explicit
// so D stays consistent with the trained classifier.

pub mod motion;
pub mod pose;
pub mod resample;

pub use motion::MotionExtractor;
pub use pose::PoseExtractor;
pub use resample::resample;

use crate::config::{Config, ExtractorKind};
use crate::error::PipelineError;
use ndarray::Array2;
use std::path::Path;

/// Variable-length sequence of per-frame feature vectors.
///
/// Invariant: `timestamps.len()` equals the number of rows; every row has
/// the extractor's fixed dimension D.
pub struct FeatureSequence {
    pub frames: Array2<f32>,
    /// Seconds from video start, one per row (decoded frame index ÷ fps).
    pub timestamps: Vec<f64>,
    pub fps: f64,
}

impl FeatureSequence {
    pub fn len(&self) -> usize {
        self.frames.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.nrows() == 0
    }

    pub fn dim(&self) -> usize {
        self.frames.ncols()
    }

    /// One feature row as an owned vector.
    pub fn row(&self, idx: usize) -> Vec<f32> {
        self.frames.row(idx).to_vec()
    }
}

/// Outcome of running an extractor over a whole video.
///
/// `NoSignal` is the explicit "nothing usable in this video" sentinel:
/// zero decodable frames, or a pose model that found landmarks nowhere.
/// Callers must treat it as skip, not as an empty table to classify.
pub enum Extraction {
    Features(FeatureSequence),
    NoSignal,
}

pub trait FeatureExtractor {
    /// Fixed per-frame feature dimension D.
    fn dim(&self) -> usize;

    fn extract(&mut self, path: &Path) -> Result<Extraction, PipelineError>;
}

/// One-shot convenience for callers without a long-lived extractor: build
/// the configured extractor and run it over a single video.
pub fn extract_features(path: &Path, config: &Config) -> Result<Extraction, PipelineError> {
    build_extractor(config)?.extract(path)
}

/// Build the configured extractor. Called once at startup.
pub fn build_extractor(config: &Config) -> Result<Box<dyn FeatureExtractor>, PipelineError> {
    match config.extractor.kind {
        ExtractorKind::Pose => Ok(Box::new(PoseExtractor::new(
            config.extractor.pose.clone(),
            config.video.clone(),
        )?)),
        ExtractorKind::Motion => Ok(Box::new(MotionExtractor::new(
            config.extractor.motion.clone(),
            config.video.clone(),
        ))),
    }
}

/// Assemble collected rows into a sequence, or the `NoSignal` sentinel
/// when nothing was collected.
pub(crate) fn finish_sequence(
    rows: Vec<f32>,
    count: usize,
    dim: usize,
    timestamps: Vec<f64>,
    fps: f64,
) -> Result<Extraction, PipelineError> {
    if count == 0 {
        return Ok(Extraction::NoSignal);
    }
    let frames = Array2::from_shape_vec((count, dim), rows)
        .map_err(|e| PipelineError::Video(format!("feature table shape error: {}", e)))?;
    Ok(Extraction::Features(FeatureSequence {
        frames,
        timestamps,
        fps,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_frames_is_no_signal_not_empty_table() {
        let outcome = finish_sequence(Vec::new(), 0, 11, Vec::new(), 25.0).unwrap();
        assert!(matches!(outcome, Extraction::NoSignal));
    }

    #[test]
    fn test_collected_rows_build_sequence() {
        let rows = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let outcome = finish_sequence(rows, 2, 3, vec![0.0, 0.12], 25.0).unwrap();
        let Extraction::Features(seq) = outcome else {
            panic!("expected a feature sequence");
        };
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.dim(), 3);
        assert_eq!(seq.row(1), vec![4.0, 5.0, 6.0]);
        assert_eq!(seq.timestamps, vec![0.0, 0.12]);
    }
}
