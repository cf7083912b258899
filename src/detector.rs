// src/detector.rs
//
// Sliding-window shot detection.
//
// The feature sequence is scanned with a window of ~0.8s of video time;
// every window is resampled to the classifier's fixed frame count and
// classified, and runs of identical consecutive predictions collapse into
// one event per stroke (a real stroke spans several overlapping windows).
//
// The merge step is a run-length compression over the label stream:
// state = last emitted event (or none); a window matching it updates the
// event in place (time, keypoints, and confidence move to the new window's
// midpoint, last-window-wins); a differing window emits a new event.

use crate::config::Config;
use crate::error::PipelineError;
use crate::features::{build_extractor, resample, Extraction, FeatureExtractor};
use crate::model::ModelStore;
use ndarray::s;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct ShotEvent {
    pub label: String,
    /// Seconds from video start, at the midpoint of the last window that
    /// contributed to this event.
    pub time: f64,
    pub confidence: Option<f32>,
    /// Feature row of the representative (midpoint) frame. Used for
    /// coaching feedback, not part of the serialized report.
    #[serde(skip)]
    pub keypoints: Vec<f32>,
}

pub struct ShotDetector {
    extractor: Box<dyn FeatureExtractor>,
    store: Arc<ModelStore>,
}

impl ShotDetector {
    pub fn new(config: &Config, store: Arc<ModelStore>) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: build_extractor(config)?,
            store,
        })
    }

    /// Detect shots in one video. A video with no usable signal yields an
    /// empty event list; only open/model failures are errors.
    pub fn analyze(&mut self, path: &Path) -> Result<Vec<ShotEvent>, PipelineError> {
        let seq = match self.extractor.extract(path)? {
            Extraction::NoSignal => {
                info!("No usable motion/pose signal in {}", path.display());
                return Ok(Vec::new());
            }
            Extraction::Features(seq) => seq,
        };

        let model = self.store.load()?;
        let target_frames = self.store.config().target_frames;

        let window_frames = window_frames_for(seq.fps);
        let stride = stride_for(window_frames);
        debug!(
            "Window plan: {} frames @ {:.1} FPS, window={} stride={}",
            seq.len(),
            seq.fps,
            window_frames,
            stride
        );

        let mut acc = EventAccumulator::new();
        let mut skipped = 0usize;
        for (start, end) in plan_windows(seq.len(), window_frames, stride) {
            let window = seq.frames.slice(s![start..end, ..]);
            let Some(vector) = resample(&window, target_frames) else {
                skipped += 1;
                continue;
            };

            let prediction = model.predict(&vector)?;
            let mid = start + (end - start) / 2;
            acc.push(
                prediction.label,
                seq.timestamps[mid],
                prediction.confidence,
                seq.row(mid),
            );
        }

        let events = acc.finish();
        info!(
            "Detected {} shot event(s) in {} ({} window(s) skipped)",
            events.len(),
            path.display(),
            skipped
        );
        Ok(events)
    }
}

/// Window length tied to real time: ~0.8s of video, floor of 8 frames.
pub fn window_frames_for(fps: f64) -> usize {
    ((fps * 0.8).round() as usize).max(8)
}

pub fn stride_for(window_frames: usize) -> usize {
    (window_frames / 2).max(4)
}

/// Window start/end pairs over a sequence of `len` frames. A sequence no
/// longer than one window is a single whole-sequence window; a trailing
/// partial window is dropped rather than zero-padded.
pub fn plan_windows(len: usize, window_frames: usize, stride: usize) -> Vec<(usize, usize)> {
    if len == 0 {
        return Vec::new();
    }
    if len <= window_frames {
        return vec![(0, len)];
    }

    let mut windows = Vec::new();
    let mut start = 0;
    while start + window_frames <= len {
        windows.push((start, start + window_frames));
        start += stride;
    }
    windows
}

/// Run-length compression over the per-window label stream.
pub struct EventAccumulator {
    events: Vec<ShotEvent>,
}

impl EventAccumulator {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, label: String, time: f64, confidence: Option<f32>, keypoints: Vec<f32>) {
        match self.events.last_mut() {
            Some(last) if last.label == label => {
                last.time = time;
                last.confidence = confidence;
                last.keypoints = keypoints;
            }
            _ => self.events.push(ShotEvent {
                label,
                time,
                confidence,
                keypoints,
            }),
        }
    }

    pub fn finish(self) -> Vec<ShotEvent> {
        self.events
    }
}

impl Default for EventAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_frames_tracks_fps() {
        assert_eq!(window_frames_for(25.0), 20);
        assert_eq!(window_frames_for(30.0), 24);
        assert_eq!(window_frames_for(60.0), 48);
        // Low frame rates floor at 8.
        assert_eq!(window_frames_for(5.0), 8);
    }

    #[test]
    fn test_stride_is_half_window_with_floor() {
        assert_eq!(stride_for(20), 10);
        assert_eq!(stride_for(8), 4);
        assert_eq!(stride_for(7), 4);
    }

    #[test]
    fn test_short_sequence_is_single_window() {
        assert_eq!(plan_windows(12, 20, 10), vec![(0, 12)]);
        assert_eq!(plan_windows(20, 20, 10), vec![(0, 20)]);
    }

    #[test]
    fn test_trailing_partial_window_dropped() {
        // A second window starting at 10 would end at 30 > 25: dropped,
        // not zero-padded.
        assert_eq!(plan_windows(25, 20, 10), vec![(0, 20)]);
    }

    #[test]
    fn test_sliding_window_coverage() {
        assert_eq!(
            plan_windows(40, 20, 10),
            vec![(0, 20), (10, 30), (20, 40)]
        );
    }

    #[test]
    fn test_empty_sequence_yields_no_windows() {
        assert!(plan_windows(0, 20, 10).is_empty());
    }

    #[test]
    fn test_identical_run_merges_to_single_event() {
        let mut acc = EventAccumulator::new();
        acc.push("bandeja".to_string(), 0.4, Some(0.7), vec![1.0]);
        acc.push("bandeja".to_string(), 0.8, Some(0.8), vec![2.0]);
        acc.push("bandeja".to_string(), 1.2, Some(0.6), vec![3.0]);

        let events = acc.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "bandeja");
        // Last-window-wins for time, confidence, and representative frame.
        assert_eq!(events[0].time, 1.2);
        assert_eq!(events[0].confidence, Some(0.6));
        assert_eq!(events[0].keypoints, vec![3.0]);
    }

    #[test]
    fn test_label_change_emits_new_event() {
        let mut acc = EventAccumulator::new();
        for (label, time) in [
            ("bandeja", 0.4),
            ("bandeja", 0.8),
            ("smash", 1.2),
            ("smash", 1.6),
            ("smash", 2.0),
        ] {
            acc.push(label.to_string(), time, None, Vec::new());
        }

        let events = acc.finish();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "bandeja");
        assert_eq!(events[0].time, 0.8);
        assert_eq!(events[1].label, "smash");
        assert_eq!(events[1].time, 2.0);
    }

    #[test]
    fn test_alternating_labels_do_not_merge() {
        let mut acc = EventAccumulator::new();
        for (label, time) in [("volley", 0.5), ("smash", 1.0), ("volley", 1.5)] {
            acc.push(label.to_string(), time, None, Vec::new());
        }
        assert_eq!(acc.finish().len(), 3);
    }
}
