// src/video.rs

use crate::error::PipelineError;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTraitConst},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// One decoded frame, RGB-packed.
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Zero-based index of this frame in the decoded stream.
    pub index: u64,
}

pub struct VideoSource {
    cap: VideoCapture,
    pub fps: f64,
    pub total_frames: i64,
    next_index: u64,
}

impl VideoSource {
    /// Open a video file. Fails with a typed error when the container cannot
    /// be opened; a garbage FPS in the metadata falls back to `default_fps`.
    pub fn open(path: &Path, default_fps: f64) -> Result<Self, PipelineError> {
        let path_str = path.to_string_lossy();
        let cap = VideoCapture::from_file(&path_str, videoio::CAP_ANY).map_err(|e| {
            PipelineError::VideoOpen {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let opened = cap.is_opened().map_err(|e| PipelineError::VideoOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !opened {
            return Err(PipelineError::VideoOpen {
                path: path.to_path_buf(),
                reason: "backend could not open container".to_string(),
            });
        }

        let mut fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS)?;
        if !fps.is_finite() || fps <= 0.0 {
            fps = default_fps;
        }
        let total_frames = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_COUNT)? as i64;

        info!(
            "Opened {} @ {:.1} FPS, {} frames",
            path.display(),
            fps,
            total_frames
        );

        Ok(Self {
            cap,
            fps,
            total_frames,
            next_index: 0,
        })
    }

    /// Decode the next frame as packed RGB. `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, PipelineError> {
        use opencv::videoio::VideoCaptureTrait;

        let mut mat = Mat::default();
        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }

        let index = self.next_index;
        self.next_index += 1;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        Ok(Some(Frame {
            data: rgb.data_bytes()?.to_vec(),
            width: rgb.cols() as usize,
            height: rgb.rows() as usize,
            index,
        }))
    }
}

/// Recursively collect video files under `input_dir`, sorted for
/// deterministic batch order.
pub fn find_video_files(input_dir: &str) -> Result<Vec<PathBuf>, PipelineError> {
    const EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

    let mut videos = Vec::new();
    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                videos.push(path.to_path_buf());
            }
        }
    }
    videos.sort();

    info!("Found {} video files in {}", videos.len(), input_dir);
    Ok(videos)
}
