// src/features/pose.rs
//
// Pose-landmark extractor backed by an ONNX pose model. Each sampled frame
// is resized to the model input, scaled to [0, 1] in CHW layout, and run
// through the session; the output is parsed as [num_landmarks, C] with
// (x, y, z) in the first three channels. Frames where the model reports no
// usable landmarks are skipped: a stroke window needs pose signal, and a
// missing frame is an extraction gap, not an error.

use super::{finish_sequence, Extraction, FeatureExtractor};
use crate::config::{PoseConfig, VideoConfig};
use crate::error::PipelineError;
use crate::video::{Frame, VideoSource};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{debug, info};

pub struct PoseExtractor {
    session: Session,
    input_name: String,
    cfg: PoseConfig,
    video: VideoConfig,
}

impl PoseExtractor {
    pub fn new(cfg: PoseConfig, video: VideoConfig) -> Result<Self, PipelineError> {
        info!("Loading pose model: {}", cfg.model_path);

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&cfg.model_path)
            .map_err(|e| {
                PipelineError::Inference(format!("failed to load pose model: {}", e))
            })?;
        let input_name = session.inputs()[0].name().to_string();

        info!(
            "✓ Pose model ready ({} landmarks, {}x{} input)",
            cfg.num_landmarks, cfg.input_size, cfg.input_size
        );

        Ok(Self {
            session,
            input_name,
            cfg,
            video,
        })
    }

    /// Run the pose model on one frame. `Ok(None)` = no landmarks detected.
    fn landmarks(&mut self, frame: &Frame) -> Result<Option<Vec<f32>>, PipelineError> {
        let size = self.cfg.input_size;
        let input = preprocess(frame, size);
        let shape = [1usize, 3, size, size];

        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.into_boxed_slice()))?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])?;
        let (_, data) = outputs[0].try_extract_tensor::<f32>()?;

        let landmarks = self.cfg.num_landmarks;
        if data.is_empty() || data.len() % landmarks != 0 {
            return Err(PipelineError::Inference(format!(
                "pose output has {} values, not divisible into {} landmarks",
                data.len(),
                landmarks
            )));
        }
        let channels = data.len() / landmarks;
        if channels < 3 {
            return Err(PipelineError::Inference(format!(
                "pose output has {} channels per landmark, need at least 3",
                channels
            )));
        }

        // Channel 3, when present, is a per-landmark score. A frame whose
        // mean score is below threshold carries no pose.
        if channels >= 4 {
            let mean_score: f32 = (0..landmarks)
                .map(|i| data[i * channels + 3])
                .sum::<f32>()
                / landmarks as f32;
            if mean_score < self.cfg.min_confidence {
                return Ok(None);
            }
        }

        let mut row = Vec::with_capacity(3 * landmarks);
        for i in 0..landmarks {
            row.extend_from_slice(&data[i * channels..i * channels + 3]);
        }
        Ok(Some(row))
    }
}

impl FeatureExtractor for PoseExtractor {
    fn dim(&self) -> usize {
        3 * self.cfg.num_landmarks
    }

    fn extract(&mut self, path: &Path) -> Result<Extraction, PipelineError> {
        let mut source = VideoSource::open(path, self.video.default_fps)?;
        let fps = source.fps;
        let dim = self.dim();
        let step = self.video.frame_step.max(1);

        let mut rows: Vec<f32> = Vec::new();
        let mut timestamps: Vec<f64> = Vec::new();
        let mut count = 0usize;
        let mut skipped = 0usize;

        while let Some(frame) = source.read_frame()? {
            if frame.index as usize % step != 0 {
                continue;
            }

            match self.landmarks(&frame)? {
                Some(row) => {
                    rows.extend(row);
                    timestamps.push(frame.index as f64 / fps);
                    count += 1;
                }
                None => skipped += 1,
            }

            if self.video.max_frames > 0 && count >= self.video.max_frames {
                break;
            }
        }

        debug!(
            "Pose extraction: {} frames with landmarks, {} without, from {}",
            count,
            skipped,
            path.display()
        );
        finish_sequence(rows, count, dim, timestamps, fps)
    }
}

/// Resize to size×size and normalize to [0, 1] in CHW layout.
fn preprocess(frame: &Frame, size: usize) -> Vec<f32> {
    let resized = resize_bilinear(&frame.data, frame.width, frame.height, size, size);

    let mut output = vec![0.0f32; 3 * size * size];
    for c in 0..3 {
        for h in 0..size {
            for w in 0..size {
                let hwc_idx = (h * size + w) * 3 + c;
                let chw_idx = c * size * size + h * size + w;
                output[chw_idx] = resized[hwc_idx] as f32 / 255.0;
            }
        }
    }
    output
}

/// Bilinear resize of packed RGB.
fn resize_bilinear(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dst_h * dst_w * 3];

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;

            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);

            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..3 {
                let p00 = src[(sy0 * src_w + sx0) * 3 + c] as f32;
                let p10 = src[(sy0 * src_w + sx1) * 3 + c] as f32;
                let p01 = src[(sy1 * src_w + sx0) * 3 + c] as f32;
                let p11 = src[(sy1 * src_w + sx1) * 3 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 3 + c] = val.round() as u8;
            }
        }
    }

    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_shape_and_scale() {
        let frame = Frame {
            data: vec![255u8; 64 * 48 * 3],
            width: 64,
            height: 48,
            index: 0,
        };
        let out = preprocess(&frame, 32);
        assert_eq!(out.len(), 3 * 32 * 32);
        assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_resize_uniform_image() {
        let src = vec![200u8; 20 * 20 * 3];
        let dst = resize_bilinear(&src, 20, 20, 10, 10);
        assert_eq!(dst.len(), 10 * 10 * 3);
        assert!(dst.iter().all(|&v| v == 200));
    }
}
