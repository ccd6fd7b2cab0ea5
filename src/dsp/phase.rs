//! Phase features of the composite waveform and phase unwrapping.
//!
//! The zero-crossing time is one phase feature; these are two smoother ones.
//! Both report `φ` for a composite of the form `A·sin(t + φ)`:
//!
//! - quadrature: correlate against `sin t` / `cos t` at the track frequency
//!   (a software lock-in), and
//! - spectral: take the argument of the strongest non-DC FFT bin.
//!
//! [`PhaseAccumulator`] turns a sequence of wrapped phases into a continuous
//! displacement, ignoring jitter below a hysteresis threshold.

use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VernierError};

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f64>> = RefCell::new(RealFftPlanner::new());
}

/// Amplitudes below this are treated as no signal.
const MIN_AMPLITUDE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEstimator {
    #[default]
    Quadrature,
    Spectral,
}

impl PhaseEstimator {
    pub fn estimate(self, times: &[f64], values: &[f64]) -> Result<f64> {
        match self {
            PhaseEstimator::Quadrature => quadrature_phase(times, values),
            PhaseEstimator::Spectral => spectral_phase(values),
        }
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = (phase + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Phase of the composite relative to `sin t`, by quadrature correlation.
///
/// Exact when the grid spans whole periods of `2π`; otherwise biased by the
/// partial period.
pub fn quadrature_phase(times: &[f64], values: &[f64]) -> Result<f64> {
    if times.len() != values.len() {
        return Err(VernierError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    if values.is_empty() {
        return Err(VernierError::EmptySamples);
    }

    let mut sum_sine = 0.0f64;
    let mut sum_cosine = 0.0f64;
    for (&t, &y) in times.iter().zip(values) {
        sum_sine += y * t.sin();
        sum_cosine += y * t.cos();
    }

    let amplitude = 2.0 * sum_sine.hypot(sum_cosine) / values.len() as f64;
    if amplitude < MIN_AMPLITUDE {
        return Err(VernierError::NoSignal);
    }
    Ok(wrap_phase(sum_cosine.atan2(sum_sine)))
}

/// Phase of the strongest non-DC component, relative to a sine starting at
/// sample 0.
pub fn spectral_phase(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(VernierError::EmptySamples);
    }

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(values.len()));
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();
    input.copy_from_slice(values);
    fft.process(&mut input, &mut spectrum)
        .map_err(|e| VernierError::Fft(e.to_string()))?;

    let (_, peak) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.norm().partial_cmp(&b.1.norm()).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or(VernierError::NoSignal)?;

    let amplitude = 2.0 * peak.norm() / values.len() as f64;
    if amplitude < MIN_AMPLITUDE {
        return Err(VernierError::NoSignal);
    }
    // A bin holds the cosine phase; sin(x + φ) = cos(x + φ - π/2).
    Ok(wrap_phase(peak.arg() + FRAC_PI_2))
}

/// Unwraps successive phase readings into a running total.
///
/// Each reading is compared against the last accepted one; the difference
/// is wrapped into `[-π, π]` and only applied once it exceeds the
/// hysteresis threshold, so jitter around a fixed phase does not drift.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseAccumulator {
    unwrapped_phase: f64,
    last_phase: f64,
    hysteresis: f64,
}

impl PhaseAccumulator {
    pub fn new(initial_phase: f64, hysteresis: f64) -> Self {
        Self {
            unwrapped_phase: 0.0,
            last_phase: initial_phase,
            hysteresis,
        }
    }

    /// Feed one wrapped phase reading; returns the unwrapped total.
    pub fn update(&mut self, phase: f64) -> f64 {
        let mut delta = phase - self.last_phase;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }

        if delta.abs() > self.hysteresis {
            self.unwrapped_phase += delta;
            self.last_phase = phase;
        }
        self.unwrapped_phase
    }

    pub fn unwrapped_phase(&self) -> f64 {
        self.unwrapped_phase
    }

    /// Unwrapped phase scaled to a distance, one cycle per `distance_per_cycle`.
    pub fn displacement(&self, distance_per_cycle: f64) -> f64 {
        self.unwrapped_phase * distance_per_cycle / TAU
    }

    /// Zero the running total without forgetting the last reading.
    pub fn reset(&mut self) {
        self.unwrapped_phase = 0.0;
    }
}
