//! Sliding-window track sensor model.
//!
//! A reader `N` tracks wide slides over a ring of `2N` phase-shifted sine
//! tracks. Its output is the overlap-weighted sum of the tracks under it;
//! the phase of that composite (first zero crossing, or a quadrature or
//! spectral phase) encodes the reader position.
//!
//! - `dsp::track`: per-track waveforms
//! - `dsp::overlap`: reader/track overlap geometry, including wraparound
//! - `dsp::adder`: the composite waveform
//! - `dsp::zero_crossing`: first-crossing extraction
//! - `dsp::phase`: phase estimators and the unwrapping accumulator
//! - `sweep`: position sweeps producing position → feature curves
//! - `config`: validated model and sampling configuration

pub mod config;
pub mod dsp;
pub mod error;
pub mod sweep;
pub mod types;

pub use config::{Model, ModelConfig, OverlapRule, SamplingConfig, Settings, ShiftMode};
pub use dsp::adder::{adder, adder_samples, CompositeWaveform};
pub use dsp::overlap::{overlap, overlap_vector, reader_window};
pub use dsp::phase::{PhaseAccumulator, PhaseEstimator};
pub use dsp::track::signal;
pub use dsp::zero_crossing::{first_crossing, first_zero_crossing, CrossingDirection};
pub use error::{Result, VernierError};
pub use sweep::{linspace, GapPolicy, SweepDriver};
pub use types::{DecodedPosition, PhaseSample, ReaderWindow, SweepCurve, SweepPoint, TrackOverlap};
