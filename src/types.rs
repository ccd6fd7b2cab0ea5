use serde::{Deserialize, Serialize};

/// The reader's span on the ring, `[leading, trailing)` in track units.
///
/// `leading` is reduced into `[0, 2N)`; `trailing = leading + N` is left
/// unwrapped so it can be compared against the `[0, 3N)` index window
/// without wraparound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReaderWindow {
    pub leading: f64,
    pub trailing: f64,
}

/// Fraction of unit track segment `idx` covered by the reader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackOverlap {
    pub idx: usize,
    pub fraction: f64,
}

/// One point of a position sweep.
///
/// `crossing_time` is `None` only for gap markers recorded under
/// `GapPolicy::Mark`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub position: f64,
    pub crossing_time: Option<f64>,
}

/// Position → first-crossing curve, in input position order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepCurve {
    pub points: Vec<SweepPoint>,
}

impl SweepCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.position)
    }

    /// Number of gap markers in the curve.
    pub fn gap_count(&self) -> usize {
        self.points.iter().filter(|p| p.crossing_time.is_none()).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    pub position: f64,
    /// Wrapped phase in `(-π, π]`.
    pub phase: f64,
}

/// A phase sample after unwrapping through a `PhaseAccumulator`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedPosition {
    pub position: f64,
    pub unwrapped_phase: f64,
    pub displacement: f64,
}
