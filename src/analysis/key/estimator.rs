//! Template-correlation key estimation
//!
//! Averages the chroma matrix into one 12-bin vector, correlates it with the
//! 24 rotated Krumhansl-Schmuckler profiles, and picks the best match.
//! Ranking is a stable sort over the fixed enumeration order (C Major,
//! C Minor, C# Major, ...), so equal correlations resolve to the lower pitch
//! and to Major before Minor.

use super::templates::{rotate, MAJOR_PROFILE, MINOR_PROFILE};
use crate::error::{MixmapError, Result};
use crate::features::ChromaMatrix;
use crate::types::{key_label, Mode, PitchClass};
use std::cmp::Ordering;
use tracing::trace;

/// Pearson correlation, or `Undefined` when an operand has zero variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Defined(f64),
    Undefined,
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Defined(v) => Some(v),
            Correlation::Undefined => None,
        }
    }

    /// Descending order with `Undefined` after every defined value
    fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Correlation::Defined(a), Correlation::Defined(b)) => b.total_cmp(a),
            (Correlation::Defined(_), Correlation::Undefined) => Ordering::Less,
            (Correlation::Undefined, Correlation::Defined(_)) => Ordering::Greater,
            (Correlation::Undefined, Correlation::Undefined) => Ordering::Equal,
        }
    }
}

/// Pearson correlation coefficient of two 12-bin vectors
pub fn pearson(x: &[f64; 12], y: &[f64; 12]) -> Correlation {
    let n = 12.0;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return Correlation::Undefined;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        Correlation::Defined(r.clamp(-1.0, 1.0))
    } else {
        Correlation::Undefined
    }
}

/// One of the 24 key hypotheses with its template correlation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCandidate {
    pub correlation: Correlation,
    pub pitch_class: PitchClass,
    pub mode: Mode,
}

impl KeyCandidate {
    /// Canonical label, e.g. "A Minor"
    pub fn label(&self) -> String {
        key_label(self.pitch_class, self.mode)
    }
}

/// Score all 24 keys against a mean chroma vector, in enumeration order
pub fn score_keys(mean_chroma: &[f64; 12]) -> Vec<KeyCandidate> {
    let mut candidates = Vec::with_capacity(24);
    for pitch_class in PitchClass::ALL {
        let shift = pitch_class.to_index() as usize;
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            candidates.push(KeyCandidate {
                correlation: pearson(mean_chroma, &rotate(profile, shift)),
                pitch_class,
                mode,
            });
        }
    }
    candidates
}

/// Rank all 24 keys, best first
///
/// Fails with `InsufficientData` for an empty matrix and `DegenerateSignal`
/// when no correlation is defined.
pub fn rank_candidates(chroma: &ChromaMatrix) -> Result<Vec<KeyCandidate>> {
    let mean = chroma.mean_vector().ok_or_else(|| {
        MixmapError::InsufficientData("chroma matrix has no frames".to_string())
    })?;

    let mut candidates = score_keys(&mean);
    // sort_by is stable: ties keep enumeration order
    candidates.sort_by(|a, b| a.correlation.rank_cmp(&b.correlation));

    if candidates
        .first()
        .map_or(true, |c| c.correlation == Correlation::Undefined)
    {
        return Err(MixmapError::DegenerateSignal);
    }

    trace!(
        "Key ranking: {:?}",
        candidates
            .iter()
            .take(3)
            .map(|c| (c.label(), c.correlation.value()))
            .collect::<Vec<_>>()
    );

    Ok(candidates)
}

/// Best-matching key for a chroma matrix
pub fn estimate_key(chroma: &ChromaMatrix) -> Result<KeyCandidate> {
    let ranked = rank_candidates(chroma)?;
    Ok(ranked[0])
}

/// Confidence in [0, 1] from the margin between the two best defined keys
///
/// A clear winner (gap of ~0.1) scores high; an ambiguous ranking or a weak
/// best correlation scores low.
pub fn ranking_confidence(ranked: &[KeyCandidate]) -> f64 {
    let mut defined = ranked.iter().filter_map(|c| c.correlation.value());
    let best = match defined.next() {
        Some(b) if b > 0.0 => b,
        _ => return 0.0,
    };
    let second = defined.next().unwrap_or(0.0);

    let gap_score = ((best - second) * 8.0).clamp(0.0, 1.0);
    let strength = best.clamp(0.0, 1.0);
    (gap_score * 0.7 + strength * 0.3).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triad_chroma(pitches: &[usize], frames: usize) -> ChromaMatrix {
        let mut frame = [0.0; 12];
        for &p in pitches {
            frame[p] = 1.0;
        }
        ChromaMatrix::from_frames(vec![frame; frames])
    }

    #[test]
    fn test_c_major_triad() {
        let key = estimate_key(&triad_chroma(&[0, 4, 7], 10)).unwrap();
        assert_eq!(key.label(), "C Major");
    }

    #[test]
    fn test_a_minor_triad() {
        // A, C, E plus the leading tone G# tips the balance to the minor profile
        let mut frame = [0.05; 12];
        frame[9] = 1.0;
        frame[0] = 0.7;
        frame[4] = 0.8;
        frame[8] = 0.4;
        let key = estimate_key(&ChromaMatrix::from_frames(vec![frame])).unwrap();
        assert_eq!(key.label(), "A Minor");
    }

    #[test]
    fn test_profile_itself_is_perfect_match() {
        let chroma = ChromaMatrix::from_frames(vec![rotate(&MINOR_PROFILE, 2)]);
        let ranked = rank_candidates(&chroma).unwrap();
        assert_eq!(ranked[0].label(), "D Minor");
        assert!((ranked[0].correlation.value().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_invariance() {
        let mut frame = [0.1; 12];
        frame[7] = 0.9;
        frame[11] = 0.6;
        frame[2] = 0.7;
        let base = estimate_key(&ChromaMatrix::from_frames(vec![frame])).unwrap();

        for scale in [0.001, 3.0, 250.0] {
            let scaled = frame.map(|v| v * scale);
            let key = estimate_key(&ChromaMatrix::from_frames(vec![scaled])).unwrap();
            assert_eq!(key.label(), base.label());
        }
    }

    #[test]
    fn test_correlations_in_range() {
        let mut frame = [0.0; 12];
        for (i, v) in frame.iter_mut().enumerate() {
            *v = ((i * 7) % 5) as f64;
        }
        for c in score_keys(&frame) {
            let r = c.correlation.value().unwrap();
            assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_enumeration_order() {
        let scored = score_keys(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        let labels: Vec<String> = scored.iter().take(4).map(|c| c.label()).collect();
        assert_eq!(labels, ["C Major", "C Minor", "C# Major", "C# Minor"]);
        assert_eq!(scored[23].label(), "B Minor");
    }

    #[test]
    fn test_empty_chroma_is_insufficient() {
        let err = estimate_key(&ChromaMatrix::default()).unwrap_err();
        assert!(matches!(err, MixmapError::InsufficientData(_)));
    }

    #[test]
    fn test_flat_chroma_is_degenerate() {
        for value in [0.0, 0.5] {
            let err = estimate_key(&ChromaMatrix::from_frames(vec![[value; 12]; 4])).unwrap_err();
            assert!(matches!(err, MixmapError::DegenerateSignal));
        }
    }

    fn candidate(correlation: Correlation, pitch_class: PitchClass, mode: Mode) -> KeyCandidate {
        KeyCandidate {
            correlation,
            pitch_class,
            mode,
        }
    }

    #[test]
    fn test_undefined_never_outranks_defined() {
        let mut ranked = vec![
            candidate(Correlation::Undefined, PitchClass::C, Mode::Major),
            candidate(Correlation::Defined(-0.9), PitchClass::D, Mode::Minor),
        ];
        ranked.sort_by(|a, b| a.correlation.rank_cmp(&b.correlation));
        assert_eq!(ranked[0].pitch_class, PitchClass::D);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let tie = Correlation::Defined(0.5);
        let mut ranked = vec![
            candidate(Correlation::Defined(0.1), PitchClass::C, Mode::Major),
            candidate(tie, PitchClass::Cs, Mode::Major),
            candidate(tie, PitchClass::Cs, Mode::Minor),
            candidate(tie, PitchClass::A, Mode::Major),
        ];
        ranked.sort_by(|a, b| a.correlation.rank_cmp(&b.correlation));
        assert_eq!(ranked[0].label(), "C# Major");
        assert_eq!(ranked[1].label(), "C# Minor");
        assert_eq!(ranked[2].label(), "A Major");
    }

    #[test]
    fn test_confidence_bounds() {
        let ranked = rank_candidates(&triad_chroma(&[0, 4, 7], 1)).unwrap();
        let confidence = ranking_confidence(&ranked);
        assert!((0.0..=1.0).contains(&confidence));
        assert!(confidence > 0.0);
        assert_eq!(ranking_confidence(&[]), 0.0);
    }
}
