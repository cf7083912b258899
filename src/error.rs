// src/error.rs
//
// Typed failures for the analysis pipeline. Per-window gaps (no landmarks,
// too little data to resample) are not errors; extractors and the detector
// skip those locally. Everything that reaches a caller goes through this enum
// so video-level failures stay distinguishable from "video had zero events".

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PipelineError {
    /// The video source could not be opened or decoded at all.
    VideoOpen { path: PathBuf, reason: String },
    /// No classifier artifact at the configured path.
    ModelMissing { path: PathBuf },
    /// Artifact exists but is below the minimum byte threshold, which in
    /// practice means a truncated or partial write.
    ModelTruncated { path: PathBuf, size: u64, min: u64 },
    /// Artifact exists at a plausible size but fails to deserialize.
    ModelCorrupt { path: PathBuf, reason: String },
    /// The classifier output width does not match the configured label set,
    /// indicating a feature/model version skew.
    ClassifierShape { expected: usize, actual: usize },
    /// ONNX Runtime failure (session build or run).
    Inference(String),
    /// OpenCV failure outside of open (mid-stream decode, conversion).
    Video(String),
    Io(std::io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::VideoOpen { path, reason } => {
                write!(f, "failed to open video {}: {}", path.display(), reason)
            }
            PipelineError::ModelMissing { path } => {
                write!(f, "model artifact missing: {}", path.display())
            }
            PipelineError::ModelTruncated { path, size, min } => {
                write!(
                    f,
                    "model artifact truncated: {} is {} bytes (minimum {})",
                    path.display(),
                    size,
                    min
                )
            }
            PipelineError::ModelCorrupt { path, reason } => {
                write!(f, "model artifact corrupt: {}: {}", path.display(), reason)
            }
            PipelineError::ClassifierShape { expected, actual } => {
                write!(
                    f,
                    "classifier output has {} classes but {} labels are configured",
                    actual, expected
                )
            }
            PipelineError::Inference(msg) => write!(f, "inference error: {}", msg),
            PipelineError::Video(msg) => write!(f, "video error: {}", msg),
            PipelineError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e)
    }
}

impl From<opencv::Error> for PipelineError {
    fn from(e: opencv::Error) -> Self {
        PipelineError::Video(e.to_string())
    }
}

impl From<ort::Error> for PipelineError {
    fn from(e: ort::Error) -> Self {
        PipelineError::Inference(e.to_string())
    }
}
