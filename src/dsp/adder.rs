use crate::config::Model;
use crate::dsp::overlap::{reader_window, segment_overlap};
use crate::dsp::track::{signal, track_sign};

/// Composite reader output at `position` and time `t`.
///
/// Sums `overlap(idx) * signal(t, idx mod 2N)` over the `[0, 3N)` window.
pub fn adder(model: &Model, position: f64, t: f64) -> f64 {
    let window = reader_window(model, position);
    let ring = model.ring();
    (0..model.window_len())
        .map(|idx| {
            let fraction = segment_overlap(&window, model, idx);
            fraction * signal(model, t, (idx % ring) as i64)
        })
        .sum()
}

/// Sample the composite at `position` over a time grid.
pub fn adder_samples(model: &Model, position: f64, times: &[f64]) -> Vec<f64> {
    CompositeWaveform::at(model, position).sample(times)
}

/// The composite at a fixed reader position, folded per phase class.
///
/// Tracks `k`, `k + N`, `k + 2N` in the window share the phase offset
/// `k * Shift`, so the composite is `Σ_k w_k sin(t + k * Shift)` with one
/// signed weight per class. Sampling then costs `N` sines per sample
/// instead of `3N`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeWaveform {
    weights: Vec<f64>,
    shift: f64,
}

impl CompositeWaveform {
    pub fn at(model: &Model, position: f64) -> Self {
        let window = reader_window(model, position);
        let n = model.tracks();
        let ring = model.ring();
        let mut weights = vec![0.0f64; n];
        for idx in 0..model.window_len() {
            let fraction = segment_overlap(&window, model, idx);
            if fraction == 0.0 {
                continue;
            }
            let canonical = idx % ring;
            weights[canonical % n] += fraction * track_sign(model, canonical as i64);
        }
        Self {
            weights,
            shift: model.shift(),
        }
    }

    /// Signed weight of each phase class `0..N`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn value(&self, t: f64) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(k, &w)| w * (t + k as f64 * self.shift).sin())
            .sum()
    }

    pub fn sample(&self, times: &[f64]) -> Vec<f64> {
        times.iter().map(|&t| self.value(t)).collect()
    }
}
