// src/model/versions.rs
//
// Read-only view over the artifact store for dashboards and diagnostics:
// current model status and the archived version history.

use crate::config::ModelConfig;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct ModelOverview {
    pub exists: bool,
    pub path: Option<String>,
    pub modified: Option<String>,
    pub size: Option<String>,
    pub archive_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelVersion {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<String>,
    pub size: String,
}

pub fn current_model_overview(cfg: &ModelConfig) -> ModelOverview {
    let path = Path::new(&cfg.path);
    let meta = fs::metadata(path).ok();

    ModelOverview {
        exists: meta.is_some(),
        path: meta.as_ref().map(|_| cfg.path.clone()),
        modified: meta.as_ref().and_then(|m| m.modified().ok()).map(fmt_mtime),
        size: meta.as_ref().map(|m| format_bytes(m.len())),
        archive_count: list_model_versions(&cfg.archive_dir).len(),
    }
}

/// Archived artifacts, sorted by file name, which sorts by timestamp
/// oldest first, given the `shot_classifier_<stamp>` naming scheme.
pub fn list_model_versions(archive_dir: &str) -> Vec<ModelVersion> {
    let entries = match fs::read_dir(archive_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut versions: Vec<ModelVersion> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("shot_classifier_")
        })
        .filter_map(|e| {
            let meta = e.metadata().ok()?;
            Some(ModelVersion {
                name: e.file_name().to_string_lossy().into_owned(),
                path: e.path(),
                modified: meta.modified().ok().map(fmt_mtime),
                size: format_bytes(meta.len()),
            })
        })
        .collect();
    versions.sort_by(|a, b| a.name.cmp(&b.name));
    versions
}

pub fn format_bytes(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if n < 1024.0 {
            return format!("{:.1} {}", n, unit);
        }
        n /= 1024.0;
    }
    format!("{:.1} TB", n)
}

fn fmt_mtime(t: std::time::SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_missing_archive_dir_is_empty() {
        assert!(list_model_versions("/nonexistent/archive/dir").is_empty());
    }
}
