// src/main.rs

use anyhow::Result;
use padel_edge::analyzer::analyze_events;
use padel_edge::config::Config;
use padel_edge::detector::ShotDetector;
use padel_edge::feedback::generate_feedback;
use padel_edge::model::{current_model_overview, load_metrics, CommandRetrainer, ModelStore};
use padel_edge::timeline::build_timeline;
use padel_edge::video::find_video_files;
use std::sync::Arc;
use tracing::{error, info};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.clone())
        .init();

    info!("🎾 Padel shot analysis starting");
    info!("✓ Configuration loaded from {}", config_path);

    let store = Arc::new(ModelStore::new(config.model.clone()));
    let retrainer = CommandRetrainer::new(&config.retrain);
    if !store.ensure_valid(&retrainer) {
        anyhow::bail!("no valid shot classifier available and repair failed");
    }

    let overview = current_model_overview(&config.model);
    info!(
        "Model: {} ({}), {} archived version(s)",
        overview.path.as_deref().unwrap_or("missing"),
        overview.size.as_deref().unwrap_or("unknown size"),
        overview.archive_count
    );
    if let Some(metrics) = load_metrics(&config.model.metrics_path) {
        if let Some(accuracy) = metrics.accuracy {
            info!(
                "Last training: accuracy {:.3} at {}",
                accuracy, metrics.timestamp
            );
        }
    }

    let mut detector = ShotDetector::new(&config, store)?;

    let videos = find_video_files(&config.video.input_dir)?;
    if videos.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    for (idx, video_path) in videos.iter().enumerate() {
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            videos.len(),
            video_path.display()
        );

        let events = match detector.analyze(video_path) {
            Ok(events) => events,
            Err(e) => {
                error!("✗ {}: {}", video_path.display(), e);
                continue;
            }
        };

        if events.is_empty() {
            info!("No shots detected in {}", video_path.display());
            continue;
        }

        let timeline = build_timeline(&events);
        let summary = analyze_events(&events);
        let feedback: Vec<Vec<String>> = events
            .iter()
            .map(|event| generate_feedback(&event.label, Some(&event.keypoints)))
            .collect();

        let report = serde_json::json!({
            "video": video_path.display().to_string(),
            "events": events,
            "timeline": timeline,
            "feedback": feedback,
            "match_summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
