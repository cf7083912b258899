// src/timeline.rs
//
// Timeline entries for dashboard consumers: one entry per merged shot
// event, with a stable display color per shot type.

use crate::detector::ShotEvent;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub shot: String,
    pub time: f64,
    pub color: &'static str,
}

pub fn shot_color(label: &str) -> &'static str {
    match label.to_ascii_lowercase().as_str() {
        "bandeja" => "#00ffb4",
        "vibora" => "#00c3ff",
        "smash" => "#ff6b6b",
        "volley" => "#ffd166",
        "forehand" => "#a78bfa",
        "backhand" => "#7dd3fc",
        _ => "#9ca3af",
    }
}

pub fn build_timeline(events: &[ShotEvent]) -> Vec<TimelineEntry> {
    events
        .iter()
        .map(|event| TimelineEntry {
            shot: event.label.clone(),
            time: event.time,
            color: shot_color(&event.label),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(label: &str, time: f64) -> ShotEvent {
        ShotEvent {
            label: label.to_string(),
            time,
            confidence: None,
            keypoints: Vec::new(),
        }
    }

    #[test]
    fn test_known_and_unknown_colors() {
        assert_eq!(shot_color("smash"), "#ff6b6b");
        assert_eq!(shot_color("Bandeja"), "#00ffb4");
        assert_eq!(shot_color("chiquita"), "#9ca3af");
    }

    #[test]
    fn test_timeline_preserves_event_order() {
        let events = [event("bandeja", 0.8), event("smash", 2.0)];
        let timeline = build_timeline(&events);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].shot, "bandeja");
        assert_eq!(timeline[0].time, 0.8);
        assert_eq!(timeline[1].color, "#ff6b6b");
    }
}
