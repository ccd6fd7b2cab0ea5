use crate::config::Model;

/// +1 for the first `N` tracks of each ring period, -1 for the second `N`.
pub fn track_sign(model: &Model, idx: i64) -> f64 {
    if idx.rem_euclid(model.ring() as i64) < model.tracks() as i64 {
        1.0
    } else {
        -1.0
    }
}

/// Phase offset of track `idx`: `(idx mod N) * Shift`.
pub fn phase_shift(model: &Model, idx: i64) -> f64 {
    idx.rem_euclid(model.tracks() as i64) as f64 * model.shift()
}

/// Waveform of track `idx` at time `t`: `sign(idx) * sin(t + phase_shift(idx))`.
///
/// Defined for every integer index; indices outside `[0, 2N)` alias their
/// canonical track.
pub fn signal(model: &Model, t: f64, idx: i64) -> f64 {
    track_sign(model, idx) * (t + phase_shift(model, idx)).sin()
}
