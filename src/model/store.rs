// src/model/store.rs
//
// Owns the classifier artifact on disk and in memory.
//
// Validity gate: exists + minimum byte size + builds as a session. Loading
// is lazy and memoized for the process lifetime; retraining swaps the file
// through archive-and-replace, so inference against an already-loaded
// artifact is never disturbed and a concurrent reader of the model path
// sees either the old file or the new one, never a partial write.

use super::classifier::LoadedModel;
use super::retrain::Retrainer;
use crate::config::ModelConfig;
use crate::error::PipelineError;
use chrono::Local;
use once_cell::sync::OnceCell;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ModelStore {
    cfg: ModelConfig,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl ModelStore {
    pub fn new(cfg: ModelConfig) -> Self {
        Self {
            cfg,
            loaded: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// File-level checks that do not touch the memoized session.
    /// Missing, truncated, and corrupt artifacts fail with distinct faults.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let path = Path::new(&self.cfg.path);

        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => {
                return Err(PipelineError::ModelMissing {
                    path: path.to_path_buf(),
                })
            }
        };

        if meta.len() < self.cfg.min_bytes {
            return Err(PipelineError::ModelTruncated {
                path: path.to_path_buf(),
                size: meta.len(),
                min: self.cfg.min_bytes,
            });
        }

        // Deserialization check: the artifact must build as a session.
        Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .commit_from_file(path)
            .map_err(|e| PipelineError::ModelCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(fault) => {
                warn!("{}", fault);
                false
            }
        }
    }

    /// Lazy, memoized load. Concurrent first callers serialize through the
    /// cell so the session is built exactly once; afterwards everyone shares
    /// the same immutable artifact reference.
    pub fn load(&self) -> Result<Arc<LoadedModel>, PipelineError> {
        self.loaded
            .get_or_try_init(|| {
                let path = Path::new(&self.cfg.path);
                let meta = fs::metadata(path).map_err(|_| PipelineError::ModelMissing {
                    path: path.to_path_buf(),
                })?;
                if meta.len() < self.cfg.min_bytes {
                    return Err(PipelineError::ModelTruncated {
                        path: path.to_path_buf(),
                        size: meta.len(),
                        min: self.cfg.min_bytes,
                    });
                }

                info!("Loading shot classifier: {}", self.cfg.path);
                let model = LoadedModel::from_file(path, self.cfg.classes.clone())?;
                info!("✓ Shot classifier ready ({} classes)", self.cfg.classes.len());
                Ok(Arc::new(model))
            })
            .cloned()
    }

    /// Gate used at startup: when the artifact is not loadable, run the
    /// external retrain procedure and re-check. Never serves a corrupt
    /// artifact; reports whether a valid one is available afterwards.
    pub fn ensure_valid(&self, retrainer: &dyn Retrainer) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(fault) => {
                warn!("{}", fault);
                info!("Attempting retrain to repair the model store");
                if let Err(e) = retrainer.retrain() {
                    error!("Retrain failed: {:#}", e);
                    return false;
                }
                match self.validate() {
                    Ok(()) => {
                        info!("✓ Model valid after retrain");
                        true
                    }
                    Err(fault) => {
                        error!("Model still not loadable after retrain: {}", fault);
                        false
                    }
                }
            }
        }
    }

    /// Move any existing artifact into the archive under a timestamped name,
    /// then write the new artifact and atomically rename it over the live
    /// path. The archive is append-only version history.
    pub fn archive_and_replace(&self, artifact: &[u8]) -> Result<(), PipelineError> {
        let model_path = Path::new(&self.cfg.path);
        if let Some(parent) = model_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if model_path.exists() {
            let archived = self.archive_current(model_path)?;
            info!("Archived previous model to {}", archived.display());
        }

        // Stage in the same directory so the final rename is atomic.
        let staged = model_path.with_extension("tmp");
        fs::write(&staged, artifact)?;
        fs::rename(&staged, model_path)?;
        info!(
            "Installed new model artifact at {} ({} bytes)",
            model_path.display(),
            artifact.len()
        );
        Ok(())
    }

    fn archive_current(&self, model_path: &Path) -> Result<PathBuf, PipelineError> {
        let archive_dir = Path::new(&self.cfg.archive_dir);
        fs::create_dir_all(archive_dir)?;

        let ext = model_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("onnx");
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        // Two generations inside the same second still get distinct names.
        let mut candidate = archive_dir.join(format!("shot_classifier_{}.{}", stamp, ext));
        let mut n = 1u32;
        while candidate.exists() {
            candidate = archive_dir.join(format!("shot_classifier_{}_{}.{}", stamp, n, ext));
            n += 1;
        }

        fs::rename(model_path, &candidate)?;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "padel_edge_store_{}_{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn store_in(dir: &Path) -> ModelStore {
        ModelStore::new(ModelConfig {
            path: dir.join("shot_classifier.onnx").to_string_lossy().into_owned(),
            archive_dir: dir.join("archive").to_string_lossy().into_owned(),
            metrics_path: dir.join("metrics.json").to_string_lossy().into_owned(),
            min_bytes: 64,
            target_frames: 32,
            classes: vec!["bandeja".to_string(), "smash".to_string()],
        })
    }

    #[test]
    fn test_missing_artifact_is_distinct_fault() {
        let dir = scratch_dir();
        let store = store_in(&dir);
        assert!(matches!(
            store.validate(),
            Err(PipelineError::ModelMissing { .. })
        ));
        assert!(!store.is_valid());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_undersized_artifact_is_truncated() {
        let dir = scratch_dir();
        let store = store_in(&dir);
        // Below min_bytes, so invalid even before any deserialization.
        fs::write(&store.config().path, b"tiny").unwrap();
        assert!(matches!(
            store.validate(),
            Err(PipelineError::ModelTruncated { size: 4, min: 64, .. })
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_garbage_artifact_is_corrupt() {
        let dir = scratch_dir();
        let store = store_in(&dir);
        fs::write(&store.config().path, vec![0xABu8; 256]).unwrap();
        assert!(matches!(
            store.validate(),
            Err(PipelineError::ModelCorrupt { .. })
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_archive_before_replace_keeps_every_generation() {
        let dir = scratch_dir();
        let store = store_in(&dir);

        store.archive_and_replace(b"generation-one-aaaaaaaaaaaaaaaa").unwrap();
        store.archive_and_replace(b"generation-two-bbbbbbbbbbbbbbbb").unwrap();
        store.archive_and_replace(b"generation-three-cccccccccccccc").unwrap();

        // Live path holds the newest artifact.
        let live = fs::read(&store.config().path).unwrap();
        assert_eq!(live, b"generation-three-cccccccccccccc");

        // One archive entry per superseded generation, distinct names.
        let mut archived: Vec<String> = fs::read_dir(&store.config().archive_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        archived.sort();
        assert_eq!(archived.len(), 2);
        assert!(archived.iter().all(|n| n.starts_with("shot_classifier_")));
        assert_ne!(archived[0], archived[1]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
