// src/feedback.rs
//
// Heuristic coaching feedback from the representative pose frame of a
// shot event. Landmark indexing follows the 33-landmark full-body
// convention (x, y, z per landmark, flattened), which is what the pose
// extractor emits; shorter feature rows (motion descriptors) simply get
// the no-data message.

const RIGHT_SHOULDER: usize = 12;
const RIGHT_ELBOW: usize = 14;

/// Elbow sitting this much lower than the shoulder (normalized image
/// coordinates, y grows downward) reads as a flat contact point.
const FLAT_ELBOW_MARGIN: f32 = 0.08;

pub fn generate_feedback(shot: &str, keypoints: Option<&[f32]>) -> Vec<String> {
    let Some(kp) = keypoints else {
        return vec!["No keypoint data for this stroke.".to_string()];
    };

    let shoulder_y = kp.get(RIGHT_SHOULDER * 3 + 1);
    let elbow_y = kp.get(RIGHT_ELBOW * 3 + 1);

    let mut messages = Vec::new();
    if let (Some(&shoulder_y), Some(&elbow_y)) = (shoulder_y, elbow_y) {
        if elbow_y > shoulder_y + FLAT_ELBOW_MARGIN {
            messages.push(format!(
                "Your {} is too flat: lift the elbow about 10 cm higher at contact.",
                shot
            ));
        }
    } else {
        return vec!["No keypoint data for this stroke.".to_string()];
    }

    if messages.is_empty() {
        messages.push("Solid stroke. Keep working on timing and consistency.".to_string());
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_frame(shoulder_y: f32, elbow_y: f32) -> Vec<f32> {
        let mut kp = vec![0.0f32; 33 * 3];
        kp[RIGHT_SHOULDER * 3 + 1] = shoulder_y;
        kp[RIGHT_ELBOW * 3 + 1] = elbow_y;
        kp
    }

    #[test]
    fn test_flat_elbow_triggers_correction() {
        let kp = pose_frame(0.40, 0.55);
        let messages = generate_feedback("bandeja", Some(&kp));
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("bandeja"));
        assert!(messages[0].contains("elbow"));
    }

    #[test]
    fn test_high_elbow_gets_encouragement() {
        let kp = pose_frame(0.40, 0.38);
        let messages = generate_feedback("smash", Some(&kp));
        assert_eq!(messages, vec![
            "Solid stroke. Keep working on timing and consistency.".to_string()
        ]);
    }

    #[test]
    fn test_missing_keypoints() {
        let messages = generate_feedback("vibora", None);
        assert_eq!(messages, vec!["No keypoint data for this stroke.".to_string()]);
    }

    #[test]
    fn test_short_feature_row_is_no_data() {
        // Motion-descriptor rows are far shorter than 33 landmarks.
        let row = vec![0.5f32; 11];
        let messages = generate_feedback("smash", Some(&row));
        assert_eq!(messages, vec!["No keypoint data for this stroke.".to_string()]);
    }
}
