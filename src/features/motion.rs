// src/features/motion.rs
//
// Motion-descriptor fallback extractor. No model required: each sampled
// frame pair is reduced to the statistics of its grayscale absolute
// difference image: {mean, max, std, N-bin histogram}. Coarser than pose
// landmarks, but enough signal for stroke-vs-no-stroke windows and usable
// on hosts without a pose model.

use super::{finish_sequence, Extraction, FeatureExtractor};
use crate::config::{MotionConfig, VideoConfig};
use crate::error::PipelineError;
use crate::video::VideoSource;
use std::path::Path;
use tracing::debug;

/// Row-major grayscale frame. Pixel at (x, y) = data[y * width + x].
struct GrayFrame {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl GrayFrame {
    /// ITU-R BT.601 luma from packed RGB.
    fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Self {
        let mut gray = Vec::with_capacity(width * height);
        for pixel in rgb.chunks_exact(3) {
            let g =
                (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32) as u8;
            gray.push(g);
        }
        Self {
            data: gray,
            width,
            height,
        }
    }
}

pub struct MotionExtractor {
    cfg: MotionConfig,
    video: VideoConfig,
}

impl MotionExtractor {
    pub fn new(cfg: MotionConfig, video: VideoConfig) -> Self {
        Self { cfg, video }
    }
}

impl FeatureExtractor for MotionExtractor {
    fn dim(&self) -> usize {
        3 + self.cfg.hist_bins
    }

    fn extract(&mut self, path: &Path) -> Result<Extraction, PipelineError> {
        let mut source = VideoSource::open(path, self.video.default_fps)?;
        let fps = source.fps;
        let dim = self.dim();
        let step = self.video.frame_step.max(1);

        let mut rows: Vec<f32> = Vec::new();
        let mut timestamps: Vec<f64> = Vec::new();
        let mut count = 0usize;
        let mut prev: Option<GrayFrame> = None;

        while let Some(frame) = source.read_frame()? {
            if frame.index as usize % step != 0 {
                continue;
            }

            let gray = GrayFrame::from_rgb(&frame.data, frame.width, frame.height);
            if let Some(p) = &prev {
                // Resolution changes mid-stream make the pair incomparable.
                if p.width == gray.width && p.height == gray.height {
                    rows.extend(diff_descriptor(p, &gray, self.cfg.hist_bins));
                    timestamps.push(frame.index as f64 / fps);
                    count += 1;
                }
            }
            // First sampled frame has no predecessor, so no descriptor.
            prev = Some(gray);

            if self.video.max_frames > 0 && count >= self.video.max_frames {
                break;
            }
        }

        debug!(
            "Motion extraction: {} descriptors from {}",
            count,
            path.display()
        );
        finish_sequence(rows, count, dim, timestamps, fps)
    }
}

/// Summarize the absolute difference of two equally sized grayscale frames
/// as [mean, max, std, hist_0..hist_bins). Histogram counts are normalized
/// by pixel count so frame size does not leak into the feature scale.
fn diff_descriptor(prev: &GrayFrame, cur: &GrayFrame, bins: usize) -> Vec<f32> {
    let n = cur.data.len();
    let mut hist = vec![0u32; bins];
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut max = 0.0f32;

    let bin_width = 256.0f32 / bins as f32;
    for (a, b) in prev.data.iter().zip(cur.data.iter()) {
        let d = (*a as i16 - *b as i16).unsigned_abs() as f32;
        sum += d as f64;
        sum_sq += (d as f64) * (d as f64);
        if d > max {
            max = d;
        }
        let bin = ((d / bin_width) as usize).min(bins - 1);
        hist[bin] += 1;
    }

    let mean = (sum / n as f64) as f32;
    let var = (sum_sq / n as f64 - (sum / n as f64).powi(2)).max(0.0);
    let std = (var as f32).sqrt();

    let mut row = Vec::with_capacity(3 + bins);
    row.push(mean);
    row.push(max);
    row.push(std);
    for count in hist {
        row.push(count as f32 / n as f32);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(data: Vec<u8>, width: usize, height: usize) -> GrayFrame {
        GrayFrame {
            data,
            width,
            height,
        }
    }

    #[test]
    fn test_constant_difference() {
        // Every pixel differs by exactly 10 → mean 10, max 10, std 0.
        let a = gray(vec![100u8; 16], 4, 4);
        let b = gray(vec![110u8; 16], 4, 4);
        let row = diff_descriptor(&a, &b, 8);

        assert_eq!(row.len(), 11);
        assert!((row[0] - 10.0).abs() < 1e-5);
        assert!((row[1] - 10.0).abs() < 1e-5);
        assert!(row[2].abs() < 1e-3);
        // All mass in bin 0 (10 < 256/8 = 32).
        assert!((row[3] - 1.0).abs() < 1e-6);
        assert!(row[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_histogram_normalized() {
        let a = gray(vec![0u8; 64], 8, 8);
        let b = gray(
            (0..64).map(|i| if i < 32 { 0u8 } else { 255 }).collect(),
            8,
            8,
        );
        let row = diff_descriptor(&a, &b, 4);
        let hist_sum: f32 = row[3..].iter().sum();
        assert!((hist_sum - 1.0).abs() < 1e-6);
        // Half zero-diff, half max-diff.
        assert!((row[3] - 0.5).abs() < 1e-6);
        assert!((row[6] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_luma_conversion_is_grayscale_identity() {
        // A gray RGB pixel maps to (approximately) its own value.
        let rgb: Vec<u8> = [128u8, 128, 128].repeat(4);
        let g = GrayFrame::from_rgb(&rgb, 2, 2);
        assert!(g.data.iter().all(|&v| (v as i16 - 128).abs() <= 1));
    }
}
