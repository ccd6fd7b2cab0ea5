//! Model and sampling configuration.
//!
//! `ModelConfig` and `SamplingConfig` are plain serde structs so they can be
//! read from YAML or JSON. Neither is used directly by the core: a
//! `ModelConfig` is validated into an immutable [`Model`] that every core
//! function takes by reference, and `SamplingConfig::validate` runs before
//! a sweep starts.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::zero_crossing::CrossingDirection;
use crate::error::{Result, VernierError};
use crate::sweep::{linspace, GapPolicy};

/// How the per-track phase offset `Shift` is chosen.
///
/// The fixed 85° offset and the balanced `2π/N` offset are two model
/// variants; `Radians` covers anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShiftMode {
    #[default]
    Degrees85,
    TwoPiOverN,
    Radians(f64),
}

impl ShiftMode {
    pub fn radians(&self, tracks: usize) -> f64 {
        match *self {
            ShiftMode::Degrees85 => 85.0 * (PI / 180.0),
            ShiftMode::TwoPiOverN => 2.0 * PI / tracks as f64,
            ShiftMode::Radians(r) => r,
        }
    }
}

/// Full-containment test used by the overlap geometry.
///
/// `Containment` is canonical: a segment is fully covered when
/// `a <= idx && idx + 1 <= b`. `OpenSpan` tests `a < idx && idx - a < N`
/// instead. It agrees with `Containment` whenever the leading edge is not
/// an integer, and drops one segment of width when it is.
///
/// Only the full-containment test differs between the two rules. Both use
/// the same partial-edge fractions (`idx + 1 - a` and `b - idx`) over the
/// unwrapped `3N` window; the older variant that measured the leading edge
/// as `a - idx` and reduced `b` modulo `2N` is not reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapRule {
    #[default]
    Containment,
    OpenSpan,
}

/// Unvalidated model parameters, as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of positive-signal tracks (`N`). The ring holds `2N` tracks.
    pub tracks: usize,
    pub shift: ShiftMode,
    pub overlap_rule: OverlapRule,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            tracks: 3,
            shift: ShiftMode::Degrees85,
            overlap_rule: OverlapRule::Containment,
        }
    }
}

impl ModelConfig {
    pub fn new(tracks: usize, shift: ShiftMode) -> Self {
        Self {
            tracks,
            shift,
            ..Self::default()
        }
    }

    pub fn with_overlap_rule(mut self, rule: OverlapRule) -> Self {
        self.overlap_rule = rule;
        self
    }

    /// Validate and freeze into a [`Model`].
    pub fn build(&self) -> Result<Model> {
        if self.tracks == 0 {
            return Err(VernierError::InvalidConfig(
                "tracks must be at least 1".into(),
            ));
        }
        // the overlap window spans 3N signed track indices
        if self
            .tracks
            .checked_mul(3)
            .map_or(true, |w| w > i64::MAX as usize)
        {
            return Err(VernierError::InvalidConfig(format!(
                "tracks must leave room for a 3N index window, got {}",
                self.tracks
            )));
        }
        let shift = self.shift.radians(self.tracks);
        if !shift.is_finite() {
            return Err(VernierError::InvalidConfig(format!(
                "shift must be finite, got {shift}"
            )));
        }
        log::debug!(
            "model: {} tracks, shift {:.6} rad, {:?} overlap",
            self.tracks,
            shift,
            self.overlap_rule
        );
        Ok(Model {
            tracks: self.tracks,
            shift,
            overlap_rule: self.overlap_rule,
        })
    }
}

/// Validated, immutable model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Model {
    tracks: usize,
    shift: f64,
    overlap_rule: OverlapRule,
}

impl Model {
    pub fn new(tracks: usize, shift: ShiftMode) -> Result<Self> {
        ModelConfig::new(tracks, shift).build()
    }

    /// `N`, the reader width in track units.
    pub fn tracks(&self) -> usize {
        self.tracks
    }

    /// `2N`, the ring circumference.
    pub fn ring(&self) -> usize {
        2 * self.tracks
    }

    /// `3N`, the unwrapped index window the overlap geometry evaluates.
    pub fn window_len(&self) -> usize {
        3 * self.tracks
    }

    /// Phase offset between neighbouring tracks, in radians.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn overlap_rule(&self) -> OverlapRule {
        self.overlap_rule
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            tracks: 3,
            shift: ShiftMode::Degrees85.radians(3),
            overlap_rule: OverlapRule::Containment,
        }
    }
}

/// Time and position grids plus the extraction policy for a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub time_start: f64,
    pub time_end: f64,
    pub time_samples: usize,
    pub position_start: f64,
    pub position_end: f64,
    pub position_samples: usize,
    pub direction: CrossingDirection,
    pub gap_policy: GapPolicy,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            time_start: 0.0,
            time_end: 8.0 * PI,
            time_samples: 1000,
            position_start: 0.0,
            position_end: 10.0,
            position_samples: 100,
            direction: CrossingDirection::Falling,
            gap_policy: GapPolicy::Abort,
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("time", self.time_start, self.time_end, self.time_samples)?;
        if self.time_end <= self.time_start {
            return Err(VernierError::InvalidConfig(format!(
                "time range must increase, got [{}, {}]",
                self.time_start, self.time_end
            )));
        }
        check_range(
            "position",
            self.position_start,
            self.position_end,
            self.position_samples,
        )
    }

    pub fn time_grid(&self) -> Vec<f64> {
        linspace(self.time_start, self.time_end, self.time_samples)
    }

    pub fn position_grid(&self) -> Vec<f64> {
        linspace(self.position_start, self.position_end, self.position_samples)
    }
}

fn check_range(name: &str, start: f64, end: f64, samples: usize) -> Result<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(VernierError::InvalidConfig(format!(
            "{name} range must be finite, got [{start}, {end}]"
        )));
    }
    if samples < 2 {
        return Err(VernierError::InvalidConfig(format!(
            "{name} grid needs at least 2 samples, got {samples}"
        )));
    }
    Ok(())
}

/// Everything a sweep run needs, in the layout of a config file:
///
/// ```yaml
/// model:
///   tracks: 3
///   shift: two_pi_over_n
/// sampling:
///   time_samples: 5000
///   gap_policy: mark
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: ModelConfig,
    pub sampling: SamplingConfig,
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        yaml_serde::from_str(text).map_err(|e| VernierError::ConfigParse(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| VernierError::ConfigParse(e.to_string()))
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let settings = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Validate both sections, returning the frozen model.
    pub fn validate(&self) -> Result<Model> {
        let model = self.model.build()?;
        self.sampling.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_matches_reference_constants() {
        let model = Model::default();
        assert_eq!(model.tracks(), 3);
        assert_eq!(model.ring(), 6);
        assert_eq!(model.window_len(), 9);
        assert!((model.shift() - 85.0_f64.to_radians()).abs() < 1e-12);
        assert_eq!(model, ModelConfig::default().build().unwrap());
    }

    #[test]
    fn test_two_pi_over_n_shift() {
        let model = Model::new(4, ShiftMode::TwoPiOverN).unwrap();
        assert!((model.shift() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_tracks_rejected() {
        let err = Model::new(0, ShiftMode::Degrees85).unwrap_err();
        assert!(matches!(err, VernierError::InvalidConfig(_)));
    }

    #[test]
    fn test_oversized_tracks_rejected() {
        for n in [usize::MAX, usize::MAX / 2 + 1, usize::MAX / 3 + 1] {
            let err = Model::new(n, ShiftMode::Degrees85).unwrap_err();
            assert!(matches!(err, VernierError::InvalidConfig(_)), "n={n}");
        }
        let largest = i64::MAX as usize / 3;
        let model = Model::new(largest, ShiftMode::Radians(0.1)).unwrap();
        assert_eq!(model.window_len(), largest * 3);
    }

    #[test]
    fn test_non_finite_shift_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Model::new(3, ShiftMode::Radians(bad)).unwrap_err();
            assert!(matches!(err, VernierError::InvalidConfig(_)), "{bad}");
        }
    }

    #[test]
    fn test_sampling_validation() {
        assert!(SamplingConfig::default().validate().is_ok());

        let short = SamplingConfig {
            time_samples: 1,
            ..SamplingConfig::default()
        };
        assert!(short.validate().is_err());

        let reversed = SamplingConfig {
            time_start: 1.0,
            time_end: 0.0,
            ..SamplingConfig::default()
        };
        assert!(reversed.validate().is_err());

        let nan = SamplingConfig {
            position_end: f64::NAN,
            ..SamplingConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_yaml_settings_fill_defaults() {
        let text = "model:\n  tracks: 4\n  shift: two_pi_over_n\n  overlap_rule: open_span\nsampling:\n  time_samples: 5000\n  gap_policy: mark\n";
        let settings = Settings::from_yaml_str(text).unwrap();
        assert_eq!(settings.model.tracks, 4);
        assert_eq!(settings.model.shift, ShiftMode::TwoPiOverN);
        assert_eq!(settings.model.overlap_rule, OverlapRule::OpenSpan);
        assert_eq!(settings.sampling.time_samples, 5000);
        assert_eq!(settings.sampling.gap_policy, GapPolicy::Mark);
        assert_eq!(settings.sampling.position_samples, 100);
        assert_eq!(settings.sampling.direction, CrossingDirection::Falling);
    }

    #[test]
    fn test_json_settings_with_custom_shift() {
        let text = r#"{"model": {"shift": {"radians": 1.25}}, "sampling": {"direction": "rising"}}"#;
        let settings = Settings::from_json_str(text).unwrap();
        assert_eq!(settings.model.tracks, 3);
        assert_eq!(settings.model.shift, ShiftMode::Radians(1.25));
        assert_eq!(settings.sampling.direction, CrossingDirection::Rising);
        let model = settings.validate().unwrap();
        assert_eq!(model.shift(), 1.25);
    }

    #[test]
    fn test_invalid_settings_fail_before_use() {
        let text = r#"{"model": {"tracks": 0}}"#;
        let settings = Settings::from_json_str(text).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = Settings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, VernierError::ConfigParse(_)));
    }
}
