// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub extractor: ExtractorConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub retrain: RetrainConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub input_dir: String,
    /// Sample every Nth decoded frame. 1 keeps the detection window at
    /// its nominal ~0.8s of wall-clock time.
    #[serde(default = "default_frame_step")]
    pub frame_step: usize,
    /// Cap on sampled frames per video. 0 = uncapped.
    #[serde(default)]
    pub max_frames: usize,
    /// Used when the container reports no usable FPS.
    #[serde(default = "default_fps")]
    pub default_fps: f64,
}

fn default_frame_step() -> usize {
    1
}

fn default_fps() -> f64 {
    25.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Pose-landmark features from an ONNX pose model.
    Pose,
    /// Frame-difference motion descriptors; needs no model.
    Motion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub kind: ExtractorKind,
    #[serde(default)]
    pub pose: PoseConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Pose model contract: one output tensor reshapeable to [num_landmarks, C]
/// with C >= 3, channels 0..3 = (x, y, z). An optional 4th channel is a
/// per-landmark score; frames whose mean score falls below `min_confidence`
/// count as "no landmarks detected" and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default = "default_pose_model")]
    pub model_path: String,
    #[serde(default = "default_pose_input")]
    pub input_size: usize,
    #[serde(default = "default_landmarks")]
    pub num_landmarks: usize,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_pose_model() -> String {
    "models/pose_landmarker.onnx".to_string()
}

fn default_pose_input() -> usize {
    256
}

fn default_landmarks() -> usize {
    33
}

fn default_min_confidence() -> f32 {
    0.5
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            model_path: default_pose_model(),
            input_size: default_pose_input(),
            num_landmarks: default_landmarks(),
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "default_hist_bins")]
    pub hist_bins: usize,
}

fn default_hist_bins() -> usize {
    8
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            hist_bins: default_hist_bins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    /// Anti-corruption heuristic: artifacts below this many bytes are
    /// treated as truncated writes even if they happen to deserialize.
    #[serde(default = "default_min_bytes")]
    pub min_bytes: u64,
    /// Every window is resampled to this many frames before classification.
    #[serde(default = "default_target_frames")]
    pub target_frames: usize,
    /// Label set the artifact was trained with, deployed alongside it.
    /// The classifier cross-checks this against the model's output width.
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
}

fn default_model_path() -> String {
    "models/shot_classifier.onnx".to_string()
}

fn default_archive_dir() -> String {
    "models/archive".to_string()
}

fn default_metrics_path() -> String {
    "models/metrics.json".to_string()
}

fn default_min_bytes() -> u64 {
    1024
}

fn default_target_frames() -> usize {
    32
}

fn default_classes() -> Vec<String> {
    ["bandeja", "vibora", "smash", "volley", "forehand", "backhand"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainConfig {
    /// External training command; empty disables auto-retrain.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_train_log")]
    pub log_path: String,
}

fn default_train_log() -> String {
    "models/train_last.log".to_string()
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            log_path: default_train_log(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "padel_edge=info,ort=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
