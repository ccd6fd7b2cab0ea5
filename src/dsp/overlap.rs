//! Reader/track overlap geometry.
//!
//! Tracks are unit-width segments `[idx, idx + 1)` laid out on an unwrapped
//! index line `0..3N`. The reader's leading edge is reduced into `[0, 2N)`
//! and its trailing edge sits `N` further along, so it never passes `3N`
//! and no segment needs wraparound handling. Indices `>= 2N` alias tracks
//! `idx - 2N` when the adder looks up their signal.

use crate::config::{Model, OverlapRule};
use crate::types::{ReaderWindow, TrackOverlap};

/// Place the reader at a continuous `position` on the ring.
pub fn reader_window(model: &Model, position: f64) -> ReaderWindow {
    let leading = position.rem_euclid(model.ring() as f64);
    ReaderWindow {
        leading,
        trailing: leading + model.tracks() as f64,
    }
}

/// Fraction of segment `idx` covered by `window`, in `[0, 1]`.
///
/// A partial edge inside the segment takes precedence over the
/// full-containment test, so each segment gets exactly one rule.
pub fn segment_overlap(window: &ReaderWindow, model: &Model, idx: usize) -> f64 {
    let (a, b) = (window.leading, window.trailing);
    let lo = idx as f64;
    let hi = lo + 1.0;

    let leading_inside = lo < a && a < hi;
    let trailing_inside = lo < b && b < hi;

    match (leading_inside, trailing_inside) {
        // Reader narrower than one segment; unreachable for N >= 1.
        (true, true) => (hi - a).min(b - lo),
        (true, false) => hi - a,
        (false, true) => b - lo,
        (false, false) => {
            let covered = match model.overlap_rule() {
                OverlapRule::Containment => a <= lo && b >= hi,
                OverlapRule::OpenSpan => a < lo && lo - a < model.tracks() as f64,
            };
            if covered {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Overlap of the reader at `position` with segment `idx` of the window.
pub fn overlap(model: &Model, position: f64, idx: usize) -> f64 {
    segment_overlap(&reader_window(model, position), model, idx)
}

/// Overlap with every segment of the `[0, 3N)` window, in index order.
pub fn overlap_vector(model: &Model, position: f64) -> Vec<TrackOverlap> {
    let window = reader_window(model, position);
    (0..model.window_len())
        .map(|idx| TrackOverlap {
            idx,
            fraction: segment_overlap(&window, model, idx),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelConfig, ShiftMode};

    fn fractions(model: &Model, position: f64) -> Vec<f64> {
        overlap_vector(model, position)
            .iter()
            .map(|o| o.fraction)
            .collect()
    }

    fn total(model: &Model, position: f64) -> f64 {
        fractions(model, position).iter().sum()
    }

    #[test]
    fn test_aligned_reader_covers_first_n_tracks() {
        let model = Model::default();
        assert_eq!(
            fractions(&model, 0.0),
            vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_partial_edges() {
        let model = Model::default();
        let f = fractions(&model, 0.25);
        assert!((f[0] - 0.75).abs() < 1e-12);
        assert_eq!(f[1], 1.0);
        assert_eq!(f[2], 1.0);
        assert!((f[3] - 0.25).abs() < 1e-12);
        assert!(f[4..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_position_wraps_around_ring() {
        let model = Model::default();
        let w = reader_window(&model, -0.5);
        assert!((w.leading - 5.5).abs() < 1e-12);
        assert!((w.trailing - 8.5).abs() < 1e-12);
        assert_eq!(fractions(&model, -0.5), fractions(&model, 5.5));
        assert_eq!(fractions(&model, 13.25), fractions(&model, 1.25));

        let f = fractions(&model, 5.5);
        assert!((f[5] - 0.5).abs() < 1e-12);
        assert_eq!(f[6], 1.0);
        assert_eq!(f[7], 1.0);
        assert!((f[8] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_width_is_conserved() {
        for n in 1..=6 {
            let model = Model::new(n, ShiftMode::TwoPiOverN).unwrap();
            for k in -40..=200 {
                let p = k as f64 * 0.137;
                let sum = total(&model, p);
                assert!((sum - n as f64).abs() < 1e-9, "n={n} p={p} sum={sum}");
            }
        }
    }

    #[test]
    fn test_width_is_conserved_on_boundaries() {
        let model = Model::default();
        for k in 0..=24 {
            let p = k as f64 * 0.5;
            assert!((total(&model, p) - 3.0).abs() < 1e-12, "p={p}");
        }
    }

    #[test]
    fn test_fractions_are_bounded() {
        let model = Model::new(2, ShiftMode::Degrees85).unwrap();
        for k in 0..500 {
            let p = k as f64 * 0.0311 - 3.0;
            for f in fractions(&model, p) {
                assert!((0.0..=1.0).contains(&f), "p={p} f={f}");
            }
        }
    }

    #[test]
    fn test_single_track_reader() {
        let model = Model::new(1, ShiftMode::TwoPiOverN).unwrap();
        let f = fractions(&model, 0.5);
        assert_eq!(f, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_open_span_drops_a_segment_at_integer_edges() {
        let model = ModelConfig::default()
            .with_overlap_rule(OverlapRule::OpenSpan)
            .build()
            .unwrap();
        assert_eq!(
            fractions(&model, 0.0),
            vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert!((total(&model, 2.0) - 2.0).abs() < 1e-12);
        // off the integers both rules agree
        let canonical = Model::default();
        for &p in &[0.5, 1.25, 2.75, 5.5] {
            assert_eq!(fractions(&model, p), fractions(&canonical, p));
        }
    }
}
