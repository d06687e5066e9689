//! Mix-point detection from abrupt bass transitions

use super::round2;

/// Earliest "previous" mix point, far enough back that the first candidate
/// always clears the debounce
const NO_PREVIOUS_POINT_SECS: f64 = -100.0;

/// Times where normalized bass jumps by more than `jump_threshold` between
/// consecutive frames, debounced so kept points are more than
/// `debounce_secs` apart
///
/// The jump between frame `t` and `t + 1` is reported at `t * frame_duration`.
pub fn detect_change_points(
    bass_norm: &[f64],
    frame_duration: f64,
    jump_threshold: f64,
    debounce_secs: f64,
) -> Vec<f64> {
    let mut points = Vec::new();
    let mut last_kept = NO_PREVIOUS_POINT_SECS;

    for (t, pair) in bass_norm.windows(2).enumerate() {
        if (pair[1] - pair[0]).abs() <= jump_threshold {
            continue;
        }
        let time = t as f64 * frame_duration;
        if time - last_kept > debounce_secs {
            points.push(round2(time));
            last_kept = time;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step curve toggling between 0 and 1 after each listed frame
    fn steps(len: usize, toggles_after: &[usize]) -> Vec<f64> {
        let mut level = 0.0;
        (0..len)
            .map(|i| {
                if i > 0 && toggles_after.contains(&(i - 1)) {
                    level = 1.0 - level;
                }
                level
            })
            .collect()
    }

    #[test]
    fn test_debounce_drops_close_jumps() {
        // Jumps at 2 s, 5 s and 20 s with 0.1 s frames
        let bass = steps(300, &[20, 50, 200]);
        assert_eq!(detect_change_points(&bass, 0.1, 0.3, 10.0), vec![2.0, 20.0]);
    }

    #[test]
    fn test_small_changes_ignored() {
        let bass: Vec<f64> = (0..100).map(|i| (i % 2) as f64 * 0.3).collect();
        assert!(detect_change_points(&bass, 0.1, 0.3, 10.0).is_empty());
    }

    #[test]
    fn test_first_frame_jump_is_kept() {
        let bass = vec![0.0, 1.0, 1.0];
        assert_eq!(detect_change_points(&bass, 0.5, 0.3, 10.0), vec![0.0]);
    }

    #[test]
    fn test_points_ascending_and_spaced() {
        let bass = steps(2000, &[10, 30, 150, 160, 400, 401, 1200]);
        let points = detect_change_points(&bass, 0.1, 0.3, 10.0);
        assert_eq!(points, vec![1.0, 15.0, 40.0, 120.0]);
        for pair in points.windows(2) {
            assert!(pair[1] - pair[0] > 10.0);
        }
    }

    #[test]
    fn test_times_are_rounded() {
        let bass = steps(10, &[3]);
        let points = detect_change_points(&bass, 512.0 / 22050.0, 0.3, 10.0);
        assert_eq!(points, vec![0.07]);
    }

    #[test]
    fn test_short_curves() {
        assert!(detect_change_points(&[], 0.1, 0.3, 10.0).is_empty());
        assert!(detect_change_points(&[1.0], 0.1, 0.3, 10.0).is_empty());
    }
}
