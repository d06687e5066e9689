//! Krumhansl-Schmuckler key profiles
//!
//! Expected pitch-class salience for a key with tonic C. Other tonics are
//! circular rotations of these two vectors.
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*.

/// Major key profile, tonic at index 0
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Minor key profile, tonic at index 0
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Rotate a profile right by `shift` so its tonic lands on pitch class `shift`
pub fn rotate(profile: &[f64; 12], shift: usize) -> [f64; 12] {
    std::array::from_fn(|j| profile[(j + 12 - shift % 12) % 12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_moves_tonic() {
        let g_major = rotate(&MAJOR_PROFILE, 7);
        assert_eq!(g_major[7], MAJOR_PROFILE[0]);
        // The fifth of G is D
        assert_eq!(g_major[2], MAJOR_PROFILE[7]);
    }

    #[test]
    fn test_rotation_by_zero_and_twelve_is_identity() {
        assert_eq!(rotate(&MINOR_PROFILE, 0), MINOR_PROFILE);
        assert_eq!(rotate(&MINOR_PROFILE, 12), MINOR_PROFILE);
    }

    #[test]
    fn test_profiles_are_nonnegative() {
        assert!(MAJOR_PROFILE.iter().chain(MINOR_PROFILE.iter()).all(|&w| w >= 0.0));
    }
}
