//! Position sweeps: evaluate the model across reader positions.
//!
//! Every position is independent, so the sweep maps positions in parallel
//! and collects in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{Model, SamplingConfig, Settings};
use crate::dsp::adder::CompositeWaveform;
use crate::dsp::phase::{PhaseAccumulator, PhaseEstimator};
use crate::dsp::zero_crossing::{first_crossing, CrossingDirection};
use crate::error::{Result, VernierError};
use crate::types::{DecodedPosition, PhaseSample, SweepCurve, SweepPoint};

/// What the sweep does with a position whose waveform never crosses zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Fail the whole sweep with the first failing position.
    #[default]
    Abort,
    /// Leave the position out of the curve and log a warning.
    Skip,
    /// Keep the position with no crossing time.
    Mark,
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = end;
            out
        }
    }
}

/// Runs the adder and an extractor over a fixed time grid for many positions.
#[derive(Debug, Clone)]
pub struct SweepDriver {
    model: Model,
    sampling: SamplingConfig,
    times: Vec<f64>,
}

impl SweepDriver {
    pub fn new(model: Model, sampling: SamplingConfig) -> Result<Self> {
        sampling.validate()?;
        let times = sampling.time_grid();
        Ok(Self {
            model,
            sampling,
            times,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = settings.validate()?;
        Self::new(model, settings.sampling.clone())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn with_direction(mut self, direction: CrossingDirection) -> Self {
        self.sampling.direction = direction;
        self
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.sampling.gap_policy = policy;
        self
    }

    /// Composite waveform sampled over the time grid at `position`.
    pub fn waveform(&self, position: f64) -> Vec<f64> {
        CompositeWaveform::at(&self.model, position).sample(&self.times)
    }

    /// First crossing time of the composite at `position`.
    pub fn crossing_at(&self, position: f64) -> Result<f64> {
        let values = self.waveform(position);
        first_crossing(&self.times, &values, self.sampling.direction)
            .map_err(|e| e.at_position(position))
    }

    /// Sweep over the configured position grid.
    pub fn run(&self) -> Result<SweepCurve> {
        self.sweep(&self.sampling.position_grid())
    }

    /// Crossing time for each position, in input order.
    ///
    /// Positions without a crossing are handled by the configured
    /// [`GapPolicy`]; under `Abort` the error names the earliest such
    /// position in input order.
    pub fn sweep(&self, positions: &[f64]) -> Result<SweepCurve> {
        log::debug!(
            "sweeping {} positions over {} time samples",
            positions.len(),
            self.times.len()
        );

        let results: Vec<Result<f64>> = positions
            .par_iter()
            .map(|&p| self.crossing_at(p))
            .collect();

        let mut points = Vec::with_capacity(positions.len());
        for (&position, result) in positions.iter().zip(results) {
            match result {
                Ok(t) => points.push(SweepPoint {
                    position,
                    crossing_time: Some(t),
                }),
                Err(VernierError::NoCrossingFound { .. })
                    if self.sampling.gap_policy != GapPolicy::Abort =>
                {
                    if self.sampling.gap_policy == GapPolicy::Skip {
                        log::warn!("no crossing at position {position}, skipping");
                    } else {
                        log::warn!("no crossing at position {position}, marking gap");
                        points.push(SweepPoint {
                            position,
                            crossing_time: None,
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let curve = SweepCurve { points };
        log::info!(
            "sweep finished: {} points, {} gaps",
            curve.len(),
            curve.gap_count()
        );
        Ok(curve)
    }

    /// Wrapped phase of the composite at each position.
    pub fn phase_sweep(
        &self,
        positions: &[f64],
        estimator: PhaseEstimator,
    ) -> Result<Vec<PhaseSample>> {
        positions
            .par_iter()
            .map(|&position| {
                let values = self.waveform(position);
                let phase = estimator.estimate(&self.times, &values)?;
                Ok(PhaseSample { position, phase })
            })
            .collect()
    }

    /// Unwrap the phase sweep into a displacement estimate.
    ///
    /// The first position is the zero reference. `positions` should step
    /// finely enough that successive phases differ by less than π.
    pub fn decode(
        &self,
        positions: &[f64],
        estimator: PhaseEstimator,
        distance_per_cycle: f64,
        hysteresis: f64,
    ) -> Result<Vec<DecodedPosition>> {
        let phases = self.phase_sweep(positions, estimator)?;
        let Some(first) = phases.first() else {
            return Ok(Vec::new());
        };

        let mut accumulator = PhaseAccumulator::new(first.phase, hysteresis);
        Ok(phases
            .iter()
            .map(|sample| {
                let unwrapped_phase = accumulator.update(sample.phase);
                DecodedPosition {
                    position: sample.position,
                    unwrapped_phase,
                    displacement: accumulator.displacement(distance_per_cycle),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelConfig, ShiftMode};
    use std::f64::consts::PI;

    fn driver(shift: ShiftMode) -> SweepDriver {
        let model = Model::new(3, shift).unwrap();
        SweepDriver::new(model, SamplingConfig::default()).unwrap()
    }

    #[test]
    fn test_linspace_matches_numpy() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        let t = linspace(0.0, 8.0 * PI, 1000);
        assert_eq!(t[999], 8.0 * PI);
        assert_eq!(t[228], 228.0 * (8.0 * PI / 999.0));
    }

    #[test]
    fn test_sweep_preserves_input_order() {
        let d = driver(ShiftMode::Degrees85);
        let positions = vec![4.2, 0.3, 9.9, 1.1, 1.1, 7.5, 0.0];
        let curve = d.sweep(&positions).unwrap();
        let got: Vec<f64> = curve.positions().collect();
        assert_eq!(got, positions);
        for (p, point) in positions.iter().zip(&curve.points) {
            assert_eq!(point.crossing_time.unwrap(), d.crossing_at(*p).unwrap());
        }
    }

    #[test]
    fn test_run_uses_position_grid() {
        let d = driver(ShiftMode::Degrees85);
        let curve = d.run().unwrap();
        assert_eq!(curve.len(), 100);
        assert_eq!(curve.points[0].position, 0.0);
        assert_eq!(curve.points[99].position, 10.0);
        assert_eq!(curve.gap_count(), 0);
    }

    fn flat_sampling(policy: GapPolicy) -> SamplingConfig {
        // a grid too short to see the composite fall through zero
        SamplingConfig {
            time_start: 0.0,
            time_end: 0.1,
            time_samples: 10,
            gap_policy: policy,
            ..SamplingConfig::default()
        }
    }

    #[test]
    fn test_abort_names_first_failing_position() {
        let d = SweepDriver::new(Model::default(), flat_sampling(GapPolicy::Abort)).unwrap();
        let err = d.sweep(&[0.0, 1.0]).unwrap_err();
        match err {
            VernierError::NoCrossingFound { position } => assert_eq!(position, Some(0.0)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_skip_and_mark_policies() {
        let positions = [0.0, 1.0, 2.0];

        let skip = SweepDriver::new(Model::default(), flat_sampling(GapPolicy::Skip)).unwrap();
        let curve = skip.sweep(&positions).unwrap();
        assert!(curve.is_empty());

        let mark = SweepDriver::new(Model::default(), flat_sampling(GapPolicy::Mark)).unwrap();
        let curve = mark.sweep(&positions).unwrap();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.gap_count(), 3);
        assert_eq!(curve.positions().collect::<Vec<_>>(), positions.to_vec());
    }

    #[test]
    fn test_rising_direction() {
        let d = driver(ShiftMode::Degrees85).with_direction(CrossingDirection::Rising);
        let falling = driver(ShiftMode::Degrees85).crossing_at(0.0).unwrap();
        let rising = d.crossing_at(0.0).unwrap();
        // a sinusoid rises through zero half a period after it falls
        assert!((rising - falling - PI).abs() < 2.0 * d.times()[1]);
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        let sampling = SamplingConfig {
            time_samples: 0,
            ..SamplingConfig::default()
        };
        assert!(SweepDriver::new(Model::default(), sampling).is_err());
    }

    #[test]
    fn test_decode_tracks_reader_position() {
        let d = driver(ShiftMode::Degrees85);
        let positions = linspace(0.0, 12.0, 121);
        // the composite repeats once per ring of 2N = 6 tracks
        let decoded = d
            .decode(&positions, PhaseEstimator::Quadrature, 6.0, 0.01)
            .unwrap();
        assert_eq!(decoded.len(), positions.len());
        assert_eq!(decoded[0].displacement, 0.0);
        for point in &decoded {
            assert!(
                (point.displacement - point.position).abs() < 0.25,
                "position {} decoded as {}",
                point.position,
                point.displacement
            );
        }
        assert!((decoded[120].unwrapped_phase - 4.0 * PI).abs() < 0.05);
    }

    #[test]
    fn test_balanced_shift_has_no_phase_at_aligned_reader() {
        let d = driver(ShiftMode::TwoPiOverN);
        let err = d.phase_sweep(&[0.0], PhaseEstimator::Quadrature).unwrap_err();
        assert!(matches!(err, VernierError::NoSignal));
        assert!(d.phase_sweep(&[1.0], PhaseEstimator::Quadrature).is_ok());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            model: ModelConfig::new(4, ShiftMode::TwoPiOverN),
            sampling: SamplingConfig {
                time_samples: 500,
                ..SamplingConfig::default()
            },
        };
        let d = SweepDriver::from_settings(&settings).unwrap();
        assert_eq!(d.model().tracks(), 4);
        assert_eq!(d.times().len(), 500);
    }
}
