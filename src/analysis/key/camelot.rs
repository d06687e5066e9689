//! Camelot Wheel and Open Key notation mapping
//!
//! The Camelot Wheel is a visual representation of musical keys that
//! makes harmonic mixing intuitive for DJs.
//!
//! - Numbers 1-12 represent positions on the wheel
//! - 'A' suffix = minor key, 'B' suffix = major key
//! - Adjacent numbers are harmonically compatible (perfect fifth)
//! - Same number, different letter = relative major/minor

use crate::types::{Mode, PitchClass};

/// Returned by [`camelot_for_label`] when a label is not in the table
pub const UNKNOWN_CAMELOT: &str = "Unknown";

/// Camelot codes for major keys, indexed by pitch class (0 = C)
const CAMELOT_MAJOR: [&str; 12] = [
    "8B", "3B", "10B", "5B", "12B", "7B", "2B", "9B", "4B", "11B", "6B", "1B",
];

/// Camelot codes for minor keys, indexed by pitch class (0 = C)
const CAMELOT_MINOR: [&str; 12] = [
    "5A", "12A", "7A", "2A", "9A", "4A", "11A", "6A", "1A", "8A", "3A", "10A",
];

/// Open Key codes for major keys ('d' = dur), indexed by pitch class
const OPEN_KEY_MAJOR: [&str; 12] = [
    "1d", "8d", "3d", "10d", "5d", "12d", "7d", "2d", "9d", "4d", "11d", "6d",
];

/// Open Key codes for minor keys ('m' = moll), indexed by pitch class
const OPEN_KEY_MINOR: [&str; 12] = [
    "10m", "5m", "12m", "7m", "2m", "9m", "4m", "11m", "6m", "1m", "8m", "3m",
];

/// Minor (A) codes by wheel position, 1A first
const WHEEL_A: [&str; 12] = [
    "1A", "2A", "3A", "4A", "5A", "6A", "7A", "8A", "9A", "10A", "11A", "12A",
];

/// Major (B) codes by wheel position, 1B first
const WHEEL_B: [&str; 12] = [
    "1B", "2B", "3B", "4B", "5B", "6B", "7B", "8B", "9B", "10B", "11B", "12B",
];

/// Camelot code for a (pitch class, mode) pair
///
/// Layout:
/// ```text
///      5A      5B
///    /    \  /    \
///  4A      4B      6B
///  |       |       |
///  3A      3B      7B
///    \    /  \    /
///      2A      8B
///       ...
/// ```
pub fn to_camelot(pitch: PitchClass, mode: Mode) -> &'static str {
    let idx = pitch.to_index() as usize;
    match mode {
        Mode::Major => CAMELOT_MAJOR[idx],
        Mode::Minor => CAMELOT_MINOR[idx],
    }
}

/// Open Key code for a (pitch class, mode) pair
///
/// Open Key uses the same wheel rotated so that C major is 1d and
/// A minor is 1m.
pub fn to_open_key(pitch: PitchClass, mode: Mode) -> &'static str {
    let idx = pitch.to_index() as usize;
    match mode {
        Mode::Major => OPEN_KEY_MAJOR[idx],
        Mode::Minor => OPEN_KEY_MINOR[idx],
    }
}

/// Parse a key label such as "F# Major" or "Gb Major" into its parts
///
/// Accepts the sharp names and the flat aliases of the five black keys,
/// one space, then `Major` or `Minor`. Anything else is rejected.
pub fn parse_key_label(label: &str) -> Option<(PitchClass, Mode)> {
    let (pitch, mode) = label.split_once(' ')?;
    Some((PitchClass::from_spelling(pitch)?, Mode::from_name(mode)?))
}

/// Camelot code for a key label, or `"Unknown"` for labels outside the table
///
/// Enharmonic spellings map to the same code: "F# Major" and "Gb Major"
/// are both "2B".
pub fn camelot_for_label(label: &str) -> &'static str {
    parse_key_label(label)
        .map(|(pitch, mode)| to_camelot(pitch, mode))
        .unwrap_or(UNKNOWN_CAMELOT)
}

/// Get harmonically compatible keys (for mixing suggestions)
///
/// Returns keys that are safe to mix with the given key:
/// - Same key
/// - +1/-1 on the wheel (perfect fifth relationship)
/// - Same number, opposite letter (relative major/minor)
pub fn compatible_keys(camelot: &str) -> Vec<&'static str> {
    let (num, letter) = parse_camelot(camelot);
    if num == 0 {
        return vec![];
    }

    let plus_one = if num == 12 { 1 } else { num + 1 };
    let minus_one = if num == 1 { 12 } else { num - 1 };
    let relative_letter = if letter == 'A' { 'B' } else { 'A' };

    vec![
        camelot_string(num, letter),
        camelot_string(plus_one, letter),
        camelot_string(minus_one, letter),
        camelot_string(num, relative_letter),
    ]
}

/// Split a Camelot code into (wheel number, letter); (0, ' ') when malformed
fn parse_camelot(code: &str) -> (u8, char) {
    let letter = match code.chars().last() {
        Some(c @ ('A' | 'B')) => c,
        _ => return (0, ' '),
    };
    match code[..code.len() - 1].parse::<u8>() {
        Ok(num @ 1..=12) => (num, letter),
        _ => (0, ' '),
    }
}

fn camelot_string(num: u8, letter: char) -> &'static str {
    let idx = (num as usize).wrapping_sub(1);
    match letter {
        'A' => WHEEL_A.get(idx).copied().unwrap_or(""),
        'B' => WHEEL_B.get(idx).copied().unwrap_or(""),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CANONICAL_PITCHES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    #[test]
    fn test_camelot_mapping_covers_all_keys() {
        let mut codes = HashSet::new();
        for pitch in CANONICAL_PITCHES {
            for mode in ["Major", "Minor"] {
                let code = camelot_for_label(&format!("{pitch} {mode}"));
                assert_ne!(code, UNKNOWN_CAMELOT, "{pitch} {mode}");
                assert!(codes.insert(code), "Duplicate code: {}", code);
            }
        }
        assert_eq!(codes.len(), 24);

        // Every wheel position has an A and a B code
        for num in 1..=12 {
            assert!(codes.contains(format!("{num}A").as_str()));
            assert!(codes.contains(format!("{num}B").as_str()));
        }
    }

    #[test]
    fn test_wheel_table() {
        let expected = [
            ("B Major", "1B"), ("G# Minor", "1A"), ("F# Major", "2B"), ("D# Minor", "2A"),
            ("C# Major", "3B"), ("A# Minor", "3A"), ("G# Major", "4B"), ("F Minor", "4A"),
            ("D# Major", "5B"), ("C Minor", "5A"), ("A# Major", "6B"), ("G Minor", "6A"),
            ("F Major", "7B"), ("D Minor", "7A"), ("C Major", "8B"), ("A Minor", "8A"),
            ("G Major", "9B"), ("E Minor", "9A"), ("D Major", "10B"), ("B Minor", "10A"),
            ("A Major", "11B"), ("F# Minor", "11A"), ("E Major", "12B"), ("C# Minor", "12A"),
        ];
        for (label, code) in expected {
            assert_eq!(camelot_for_label(label), code, "{label}");
        }
    }

    #[test]
    fn test_enharmonic_aliases() {
        assert_eq!(camelot_for_label("F# Major"), "2B");
        assert_eq!(camelot_for_label("Gb Major"), "2B");
        assert_eq!(camelot_for_label("G# Minor"), "1A");
        assert_eq!(camelot_for_label("Ab Minor"), "1A");
        assert_eq!(camelot_for_label("Db Minor"), "12A");
        assert_eq!(camelot_for_label("Bb Major"), "6B");
        assert_eq!(camelot_for_label("Eb Minor"), "2A");
    }

    #[test]
    fn test_unknown_labels() {
        for label in ["", "H Major", "C major", "C  Major", "Cb Major", "C Dorian", "8B"] {
            assert_eq!(camelot_for_label(label), UNKNOWN_CAMELOT, "{label:?}");
        }
    }

    #[test]
    fn test_open_key_examples() {
        assert_eq!(to_open_key(PitchClass::C, Mode::Major), "1d");
        assert_eq!(to_open_key(PitchClass::A, Mode::Minor), "1m");
        assert_eq!(to_open_key(PitchClass::G, Mode::Major), "2d");
        assert_eq!(to_open_key(PitchClass::F, Mode::Major), "12d");
    }

    #[test]
    fn test_compatible_keys() {
        let compatible = compatible_keys("8A");
        assert_eq!(compatible, vec!["8A", "9A", "7A", "8B"]);
    }

    #[test]
    fn test_compatible_keys_wrap() {
        let compatible = compatible_keys("12A");
        assert!(compatible.contains(&"1A"));
        assert!(compatible.contains(&"11A"));

        let compatible = compatible_keys("1B");
        assert!(compatible.contains(&"12B"));
        assert!(compatible.contains(&"2B"));
    }

    #[test]
    fn test_compatible_keys_rejects_garbage() {
        assert!(compatible_keys("Unknown").is_empty());
        assert!(compatible_keys("13A").is_empty());
        assert!(compatible_keys("").is_empty());
    }
}
