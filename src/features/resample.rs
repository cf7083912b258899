// src/features/resample.rs
//
// Fixed-length resampling of a variable-length feature table. The
// classifier has a fixed input dimension, so every window (or whole short
// clip) must flatten to exactly target_frames × D values no matter how
// many frames it spans.

use ndarray::{ArrayBase, Data, Ix2};

/// Resample a (frames × D) table to exactly `target_frames` rows via
/// per-dimension linear interpolation over the normalized frame index,
/// flattened frame-major.
///
/// A table that already has `target_frames` rows passes through unchanged.
/// Returns `None` for an empty table (0 rows or 0 columns) or a zero
/// target: "insufficient data", to be skipped by the caller, not an error.
pub fn resample<S>(seq: &ArrayBase<S, Ix2>, target_frames: usize) -> Option<Vec<f32>>
where
    S: Data<Elem = f32>,
{
    let (len, dim) = seq.dim();
    if len == 0 || dim == 0 || target_frames == 0 {
        return None;
    }

    if len == target_frames {
        return Some(seq.iter().copied().collect());
    }

    let mut out = Vec::with_capacity(target_frames * dim);
    for i in 0..target_frames {
        // Evenly spaced positions spanning [0, len-1].
        let pos = if target_frames == 1 {
            0.0
        } else {
            i as f64 * (len - 1) as f64 / (target_frames - 1) as f64
        };
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(len - 1);
        let t = (pos - lo as f64) as f32;

        for d in 0..dim {
            let a = seq[[lo, d]];
            let b = seq[[hi, d]];
            out.push(a + (b - a) * t);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn test_passthrough_when_length_matches() {
        let seq = arr2(&[[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let out = resample(&seq, 3).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_linear_interpolation_downsample() {
        // 10 frames, 1-D ramp 0..9 → 5 evenly spaced positions.
        let values: Vec<[f32; 1]> = (0..10).map(|v| [v as f32]).collect();
        let seq = arr2(&values);
        let out = resample(&seq, 5).unwrap();
        assert_eq!(out, vec![0.0, 2.25, 4.5, 6.75, 9.0]);
    }

    #[test]
    fn test_output_length_invariant() {
        for len in [1usize, 2, 7, 40] {
            for target in [1usize, 4, 16, 33] {
                let rows: Vec<[f32; 3]> = (0..len).map(|v| [v as f32, 0.5, -1.0]).collect();
                let seq = arr2(&rows);
                let out = resample(&seq, target).unwrap();
                assert_eq!(out.len(), target * 3, "len={} target={}", len, target);
            }
        }
    }

    #[test]
    fn test_single_frame_repeats() {
        let seq = arr2(&[[7.0f32, -2.0]]);
        let out = resample(&seq, 4).unwrap();
        assert_eq!(out, vec![7.0, -2.0, 7.0, -2.0, 7.0, -2.0, 7.0, -2.0]);
    }

    #[test]
    fn test_empty_table_is_none() {
        let seq = Array2::<f32>::zeros((0, 4));
        assert!(resample(&seq, 8).is_none());

        let seq = Array2::<f32>::zeros((4, 0));
        assert!(resample(&seq, 8).is_none());
    }
}
