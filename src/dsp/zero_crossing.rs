use serde::{Deserialize, Serialize};

use crate::error::{Result, VernierError};

/// Which sign change counts as a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    /// `y[i] > 0` followed by `y[i + 1] <= 0`.
    #[default]
    Falling,
    /// `y[i] <= 0` followed by `y[i + 1] > 0`.
    Rising,
}

impl CrossingDirection {
    pub fn crosses(self, prev: f64, curr: f64) -> bool {
        let prev_positive = prev > 0.0;
        let curr_positive = curr > 0.0;
        match self {
            CrossingDirection::Falling => prev_positive && !curr_positive,
            CrossingDirection::Rising => !prev_positive && curr_positive,
        }
    }
}

/// Time of the first positive-to-negative crossing.
///
/// Returns the time of the last positive sample before the crossing, not an
/// interpolated root. Crossings narrower than the sample spacing can be
/// missed; the caller picks the density.
pub fn first_zero_crossing(times: &[f64], values: &[f64]) -> Result<f64> {
    first_crossing(times, values, CrossingDirection::Falling)
}

pub fn first_crossing(times: &[f64], values: &[f64], direction: CrossingDirection) -> Result<f64> {
    check_lengths(times, values)?;
    match find_crossing(times, values, direction, 0)? {
        Some(i) => Ok(times[i]),
        None => Err(VernierError::NoCrossingFound { position: None }),
    }
}

/// Sample times of every qualifying crossing, earliest first.
pub fn zero_crossings(
    times: &[f64],
    values: &[f64],
    direction: CrossingDirection,
) -> Result<Vec<f64>> {
    check_lengths(times, values)?;
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(i) = find_crossing(times, values, direction, from)? {
        out.push(times[i]);
        from = i + 1;
    }
    Ok(out)
}

/// Like [`first_crossing`], but linearly interpolates the root between the
/// two samples that bracket it.
pub fn interpolated_crossing(
    times: &[f64],
    values: &[f64],
    direction: CrossingDirection,
) -> Result<f64> {
    check_lengths(times, values)?;
    let i = find_crossing(times, values, direction, 0)?
        .ok_or(VernierError::NoCrossingFound { position: None })?;
    let (t0, t1) = (times[i], times[i + 1]);
    let (y0, y1) = (values[i], values[i + 1]);
    if y0 == y1 {
        return Ok(t0);
    }
    Ok(t0 + (t1 - t0) * y0 / (y0 - y1))
}

fn check_lengths(times: &[f64], values: &[f64]) -> Result<()> {
    if times.len() != values.len() {
        return Err(VernierError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    Ok(())
}

/// Index `i >= from` of the first pair `(i, i + 1)` that crosses.
/// Checks time ordering up to the crossing it returns.
fn find_crossing(
    times: &[f64],
    values: &[f64],
    direction: CrossingDirection,
    from: usize,
) -> Result<Option<usize>> {
    for i in (from + 1)..values.len() {
        if times[i] < times[i - 1] {
            return Err(VernierError::UnorderedSamples { index: i });
        }
        if direction.crosses(values[i - 1], values[i]) {
            return Ok(Some(i - 1));
        }
    }
    Ok(None)
}
